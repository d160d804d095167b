//! Match state machine: scores, action counters, termination and the
//! single-use probability adjustment.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::adjustment::adjusted_probability;
use super::draws::{draw_max_actions, draw_max_score};
use super::kinds::{ActionKind, Actor, DurationClass, Team};
use super::roll::Roll;
use crate::config::{ConfigProvider, DurationRange};
use crate::error::CoreError;

/// Opaque match identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(Uuid);

impl MatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for MatchId {
    type Err = CoreError;

    /// Anything that is not a UUID cannot name a match.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(MatchId)
            .map_err(|_| CoreError::NotFound(format!("Game not found: {s}")))
    }
}

/// Result of resolving one player action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionResolution {
    pub success: bool,
    pub effective_probability: f64,
    /// The uniform draw, if one was taken
    pub roll: Option<f64>,
}

/// Serializable view of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    #[serde(rename = "game_id")]
    pub id: MatchId,
    pub blue_score: u32,
    pub red_score: u32,
    pub player_action_count: u32,
    pub total_action_count: u32,
    pub max_score: u32,
    pub max_player_actions: u32,
    pub max_actions: u32,
    pub duration: DurationClass,
    #[serde(rename = "is_game_over")]
    pub is_over: bool,
    #[serde(rename = "game_over_reason")]
    pub over_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One playthrough.
///
/// Limits are fixed at construction. Counters and scores only grow, and once
/// the match is over it stays over with its first recorded reason. Rejecting
/// mutations after the end is the caller's job (see `GameService`).
#[derive(Debug, Clone)]
pub struct MatchState {
    id: MatchId,
    blue_score: u32,
    red_score: u32,
    player_action_count: u32,
    total_action_count: u32,
    max_score: u32,
    max_player_actions: u32,
    duration: DurationClass,
    max_actions: u32,
    is_over: bool,
    over_reason: Option<String>,
    created_at: DateTime<Utc>,
    pending_adjustment: [Option<f64>; 4],
}

impl MatchState {
    /// Create a match, drawing the score cap and then the action budget.
    pub fn new<R: Roll + ?Sized>(
        id: MatchId,
        duration: DurationClass,
        max_player_actions: u32,
        range: Option<DurationRange>,
        roll: &mut R,
    ) -> Self {
        let max_score = draw_max_score(roll);
        let max_actions = draw_max_actions(roll, range);
        Self::with_limits(id, duration, max_score, max_player_actions, max_actions)
    }

    /// Create a match with explicit limits instead of random draws.
    pub fn with_limits(
        id: MatchId,
        duration: DurationClass,
        max_score: u32,
        max_player_actions: u32,
        max_actions: u32,
    ) -> Self {
        Self {
            id,
            blue_score: 0,
            red_score: 0,
            player_action_count: 0,
            total_action_count: 0,
            max_score,
            max_player_actions,
            duration,
            max_actions,
            is_over: false,
            over_reason: None,
            created_at: Utc::now(),
            pending_adjustment: [None; 4],
        }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    pub fn score(&self, team: Team) -> u32 {
        match team {
            Team::Blue => self.blue_score,
            Team::Red => self.red_score,
        }
    }

    pub fn player_action_count(&self) -> u32 {
        self.player_action_count
    }

    pub fn total_action_count(&self) -> u32 {
        self.total_action_count
    }

    pub fn max_score(&self) -> u32 {
        self.max_score
    }

    pub fn max_player_actions(&self) -> u32 {
        self.max_player_actions
    }

    pub fn max_actions(&self) -> u32 {
        self.max_actions
    }

    pub fn duration(&self) -> DurationClass {
        self.duration
    }

    pub fn is_over(&self) -> bool {
        self.is_over
    }

    pub fn over_reason(&self) -> Option<&str> {
        self.over_reason.as_deref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn pending_adjustment(&self, action: ActionKind) -> Option<f64> {
        self.pending_adjustment[action.index()]
    }

    /// `IllegalState` if the match has already ended.
    pub fn ensure_in_play(&self) -> Result<(), CoreError> {
        if self.is_over {
            let reason = self.over_reason.as_deref().unwrap_or("unknown reason");
            return Err(CoreError::IllegalState(format!("Game is over: {reason}")));
        }
        Ok(())
    }

    // ========================
    // Counters and score
    // ========================

    pub fn increment_player_action(&mut self) {
        self.player_action_count = self.player_action_count.saturating_add(1);
        self.total_action_count = self.total_action_count.saturating_add(1);
        self.check_game_over();
    }

    /// Count an opponent action (total only).
    pub fn increment_total_action(&mut self) {
        self.total_action_count = self.total_action_count.saturating_add(1);
        self.check_game_over();
    }

    pub fn update_score(&mut self, team: Team, points: u32) {
        match team {
            Team::Blue => self.blue_score = self.blue_score.saturating_add(points),
            Team::Red => self.red_score = self.red_score.saturating_add(points),
        }
        self.check_game_over();
    }

    /// Evaluate the end conditions. No-op once the match is over.
    ///
    /// Conditions are checked in the order blue score, red score, player
    /// action cap, total action budget; when several hold in the same pass the
    /// last one supplies the reason.
    pub fn check_game_over(&mut self) {
        if self.is_over {
            return;
        }

        let mut reason = None;
        for team in [Team::Blue, Team::Red] {
            if self.score(team) >= self.max_score {
                reason = Some(format!(
                    "{} team reached max score ({})",
                    team.display_name(),
                    self.max_score
                ));
            }
        }
        if self.player_action_count >= self.max_player_actions {
            reason = Some(format!("Reached max player actions ({})", self.max_player_actions));
        }
        if self.total_action_count >= self.max_actions {
            reason = Some(format!("Game ended after {} actions", self.max_actions));
        }

        if let Some(reason) = reason {
            tracing::info!(
                match_id = %self.id,
                blue = self.blue_score,
                red = self.red_score,
                total_actions = self.total_action_count,
                %reason,
                "Match over"
            );
            self.is_over = true;
            self.over_reason = Some(reason);
        }
    }

    // ========================
    // Probabilities
    // ========================

    /// Store the adjusted player probability for the next `action`.
    pub fn adjust_probability(
        &mut self,
        action: ActionKind,
        prerequisite_satisfied: bool,
        config: &dyn ConfigProvider,
    ) {
        let base = config.probability(Actor::Player, action);
        self.pending_adjustment[action.index()] =
            Some(adjusted_probability(base, prerequisite_satisfied));
    }

    /// Pending adjustment for player actions, otherwise the configured base.
    pub fn current_probability(
        &self,
        actor: Actor,
        action: ActionKind,
        config: &dyn ConfigProvider,
    ) -> f64 {
        if actor == Actor::Player {
            if let Some(p) = self.pending_adjustment(action) {
                return p;
            }
        }
        config.probability(actor, action)
    }

    pub fn clear_adjustment(&mut self, action: ActionKind) {
        self.pending_adjustment[action.index()] = None;
    }

    /// Run one player action through adjust, count, roll and clear.
    ///
    /// An unsatisfied prerequisite fails without consuming a draw. The caller
    /// is expected to have checked [`ensure_in_play`](Self::ensure_in_play).
    pub fn resolve_action<R: Roll + ?Sized>(
        &mut self,
        action: ActionKind,
        prerequisite_satisfied: bool,
        config: &dyn ConfigProvider,
        roll: &mut R,
    ) -> ActionResolution {
        self.adjust_probability(action, prerequisite_satisfied, config);
        let effective_probability = self.current_probability(Actor::Player, action, config);

        self.increment_player_action();

        let (success, drawn) = if prerequisite_satisfied {
            let u = roll.roll_unit();
            (u < effective_probability, Some(u))
        } else {
            (false, None)
        };

        self.clear_adjustment(action);

        tracing::debug!(
            match_id = %self.id,
            %action,
            prerequisite_satisfied,
            probability = effective_probability,
            roll = ?drawn,
            success,
            "Action resolved"
        );

        ActionResolution { success, effective_probability, roll: drawn }
    }

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            id: self.id,
            blue_score: self.blue_score,
            red_score: self.red_score,
            player_action_count: self.player_action_count,
            total_action_count: self.total_action_count,
            max_score: self.max_score,
            max_player_actions: self.max_player_actions,
            max_actions: self.max_actions,
            duration: self.duration,
            is_over: self.is_over,
            over_reason: self.over_reason.clone(),
            created_at: self.created_at,
        }
    }
}
