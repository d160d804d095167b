//! Game service: the operations exposed to request handlers.
//!
//! Owns the registry, the runtime configuration and the random source. Every
//! mutation checks that the match is still in play first and reports
//! `IllegalState` otherwise.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigProvider, DurationRange, RuntimeConfig};
use crate::error::{CoreError, Result};
use crate::game::{ActionKind, Actor, DurationClass, MatchId, MatchSnapshot, Roll, Team};
use crate::registry::MatchRegistry;

/// Summary returned when a match starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StartedMatch {
    #[serde(rename = "game_id")]
    pub match_id: MatchId,
    pub max_score: u32,
    pub max_player_actions: u32,
    pub max_actions: u32,
    pub total_action_count: u32,
    pub duration: DurationClass,
}

impl From<&MatchSnapshot> for StartedMatch {
    fn from(s: &MatchSnapshot) -> Self {
        Self {
            match_id: s.id,
            max_score: s.max_score,
            max_player_actions: s.max_player_actions,
            max_actions: s.max_actions,
            total_action_count: s.total_action_count,
            duration: s.duration,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(rename = "action_success")]
    pub success: bool,
    #[serde(rename = "probability")]
    pub effective_probability: f64,
    #[serde(rename = "game")]
    pub snapshot: MatchSnapshot,
}

/// Player base probabilities as shown to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicProbabilities {
    pub probabilities: BTreeMap<ActionKind, f64>,
    pub goalkeeper_save: f64,
}

/// Service random source that holds its lock for a single draw only.
struct SharedRng<'a>(&'a Mutex<ChaCha8Rng>);

impl SharedRng<'_> {
    fn lock(&self) -> std::sync::MutexGuard<'_, ChaCha8Rng> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RngCore for SharedRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.lock().next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.lock().next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.lock().fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.lock().try_fill_bytes(dest)
    }
}

pub struct GameService {
    registry: MatchRegistry,
    config: Arc<RuntimeConfig>,
    rng: Mutex<ChaCha8Rng>,
}

impl GameService {
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Reproducible service: the same seed and calls give the same matches.
    pub fn with_seed(config: RuntimeConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: RuntimeConfig, rng: ChaCha8Rng) -> Self {
        let config = Arc::new(config);
        let provider: Arc<dyn ConfigProvider> = config.clone();
        Self { registry: MatchRegistry::new(provider), config, rng: Mutex::new(rng) }
    }

    pub fn registry(&self) -> &MatchRegistry {
        &self.registry
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    // ========================
    // Match lifecycle
    // ========================

    pub fn create(&self, duration: DurationClass) -> Result<StartedMatch> {
        self.create_with(duration, &mut SharedRng(&self.rng))
    }

    pub fn create_with<R: Roll + ?Sized>(
        &self,
        duration: DurationClass,
        roll: &mut R,
    ) -> Result<StartedMatch> {
        let handle = self.registry.create_match(duration, roll);
        let snapshot = handle
            .lock()
            .map_err(|_| CoreError::Internal("New match lock poisoned".to_string()))?
            .snapshot();
        Ok(StartedMatch::from(&snapshot))
    }

    pub fn get_state(&self, id: MatchId) -> Result<MatchSnapshot> {
        self.registry.with_match(id, |m| Ok(m.snapshot()))
    }

    /// Resolve a player action using the service's random source.
    pub fn submit_action(
        &self,
        id: MatchId,
        action: ActionKind,
        prerequisite_satisfied: bool,
    ) -> Result<ActionOutcome> {
        self.submit_action_with(id, action, prerequisite_satisfied, &mut SharedRng(&self.rng))
    }

    /// Resolve a player action drawing from `roll` instead.
    pub fn submit_action_with<R: Roll + ?Sized>(
        &self,
        id: MatchId,
        action: ActionKind,
        prerequisite_satisfied: bool,
        roll: &mut R,
    ) -> Result<ActionOutcome> {
        self.registry.with_match(id, |m| {
            m.ensure_in_play()?;
            let resolution =
                m.resolve_action(action, prerequisite_satisfied, self.config.as_ref(), roll);
            Ok(ActionOutcome {
                success: resolution.success,
                effective_probability: resolution.effective_probability,
                snapshot: m.snapshot(),
            })
        })
    }

    pub fn update_score(&self, id: MatchId, team: Team, points: u32) -> Result<MatchSnapshot> {
        self.registry.with_match(id, |m| {
            m.ensure_in_play()?;
            m.update_score(team, points);
            tracing::debug!(match_id = %id, %team, points, "Score updated");
            Ok(m.snapshot())
        })
    }

    /// Count one opponent action toward the match's total budget.
    pub fn record_opponent_action(&self, id: MatchId) -> Result<MatchSnapshot> {
        self.registry.with_match(id, |m| {
            m.ensure_in_play()?;
            m.increment_total_action();
            Ok(m.snapshot())
        })
    }

    pub fn effective_probability(
        &self,
        id: MatchId,
        actor: Actor,
        action: ActionKind,
    ) -> Result<f64> {
        self.registry
            .with_match(id, |m| Ok(m.current_probability(actor, action, self.config.as_ref())))
    }

    // ========================
    // Configuration
    // ========================

    pub fn set_probability_override(
        &self,
        actor: Actor,
        action: ActionKind,
        value: f64,
    ) -> Result<()> {
        self.config.set_override(actor, action, Some(value))
    }

    pub fn clear_probability_override(&self, actor: Actor, action: ActionKind) -> Result<()> {
        self.config.set_override(actor, action, None)
    }

    /// Player base probabilities from the startup table. Runtime overrides
    /// are not reflected here; read them per match with
    /// [`effective_probability`](Self::effective_probability).
    pub fn public_probabilities(&self) -> PublicProbabilities {
        let base = self.config.base();
        PublicProbabilities {
            probabilities: ActionKind::ALL
                .iter()
                .map(|&a| (a, base.probability(Actor::Player, a)))
                .collect(),
            goalkeeper_save: base.goalkeeper_save_probability(),
        }
    }

    pub fn duration_settings(&self) -> BTreeMap<DurationClass, DurationRange> {
        self.config.duration_ranges()
    }
}

impl Default for GameService {
    fn default() -> Self {
        Self::new(RuntimeConfig::default())
    }
}
