//! Closed vocabularies of the match engine: teams, actors, actions and
//! duration classes. Parsing from the wire is the only place an unknown name
//! can appear, so every `FromStr` reports `InvalidArgument`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Blue,
    Red,
}

impl Team {
    pub fn as_str(&self) -> &'static str {
        match self {
            Team::Blue => "blue",
            Team::Red => "red",
        }
    }

    /// Capitalized name used in game-over reasons
    pub fn display_name(&self) -> &'static str {
        match self {
            Team::Blue => "Blue",
            Team::Red => "Red",
        }
    }
}

impl FromStr for Team {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blue" => Ok(Team::Blue),
            "red" => Ok(Team::Red),
            other => Err(CoreError::InvalidArgument(format!("Invalid team: {other}"))),
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who performs an action. Only player actions are ever adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Player,
    Opponent,
}

impl Actor {
    pub const ALL: [Actor; 2] = [Actor::Player, Actor::Opponent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Actor::Player => "player",
            Actor::Opponent => "opponent",
        }
    }
}

impl FromStr for Actor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "player" => Ok(Actor::Player),
            "opponent" => Ok(Actor::Opponent),
            other => Err(CoreError::InvalidArgument(format!(
                "Invalid actor: {other}. Must be 'player' or 'opponent'"
            ))),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Pass,
    Dribble,
    Shoot,
    Tackle,
}

impl ActionKind {
    pub const ALL: [ActionKind; 4] =
        [ActionKind::Pass, ActionKind::Dribble, ActionKind::Shoot, ActionKind::Tackle];

    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Pass => "pass",
            ActionKind::Dribble => "dribble",
            ActionKind::Shoot => "shoot",
            ActionKind::Tackle => "tackle",
        }
    }

    /// Position in `ALL`, used for fixed-size per-action tables
    pub fn index(&self) -> usize {
        match self {
            ActionKind::Pass => 0,
            ActionKind::Dribble => 1,
            ActionKind::Shoot => 2,
            ActionKind::Tackle => 3,
        }
    }
}

impl FromStr for ActionKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pass" => Ok(ActionKind::Pass),
            "dribble" => Ok(ActionKind::Dribble),
            "shoot" => Ok(ActionKind::Shoot),
            "tackle" => Ok(ActionKind::Tackle),
            other => Err(CoreError::InvalidArgument(format!("Invalid action: {other}"))),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named bucket selecting the range of a match's total-action budget.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum DurationClass {
    Tiny,
    Short,
    #[default]
    Regular,
    Long,
}

impl DurationClass {
    pub const ALL: [DurationClass; 4] =
        [DurationClass::Tiny, DurationClass::Short, DurationClass::Regular, DurationClass::Long];

    pub fn as_str(&self) -> &'static str {
        match self {
            DurationClass::Tiny => "tiny",
            DurationClass::Short => "short",
            DurationClass::Regular => "regular",
            DurationClass::Long => "long",
        }
    }

    /// Lenient parse used by request handlers: unknown names mean `Regular`.
    pub fn parse_or_regular(s: &str) -> Self {
        s.parse().unwrap_or_default()
    }
}

impl FromStr for DurationClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiny" => Ok(DurationClass::Tiny),
            "short" => Ok(DurationClass::Short),
            "regular" => Ok(DurationClass::Regular),
            "long" => Ok(DurationClass::Long),
            other => Err(CoreError::InvalidArgument(format!("Invalid duration: {other}"))),
        }
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_names() {
        assert_eq!("blue".parse::<Team>().unwrap(), Team::Blue);
        assert_eq!("opponent".parse::<Actor>().unwrap(), Actor::Opponent);
        assert_eq!("tackle".parse::<ActionKind>().unwrap(), ActionKind::Tackle);
        assert_eq!("tiny".parse::<DurationClass>().unwrap(), DurationClass::Tiny);
    }

    #[test]
    fn test_unknown_names_are_invalid_argument() {
        assert!(matches!("green".parse::<Team>(), Err(CoreError::InvalidArgument(_))));
        assert!(matches!("referee".parse::<Actor>(), Err(CoreError::InvalidArgument(_))));
        assert!(matches!("header".parse::<ActionKind>(), Err(CoreError::InvalidArgument(_))));
    }

    #[test]
    fn test_unknown_duration_falls_back_to_regular() {
        assert_eq!(DurationClass::parse_or_regular("marathon"), DurationClass::Regular);
        assert_eq!(DurationClass::parse_or_regular("long"), DurationClass::Long);
    }

    #[test]
    fn test_action_index_matches_all_order() {
        for (i, action) in ActionKind::ALL.iter().enumerate() {
            assert_eq!(action.index(), i);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&DurationClass::Short).unwrap();
        assert_eq!(json, "\"short\"");
        let action: ActionKind = serde_json::from_str("\"dribble\"").unwrap();
        assert_eq!(action, ActionKind::Dribble);
    }
}
