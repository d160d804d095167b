//! # Game configuration
//!
//! Read-only startup configuration in the shape of `game_config.json`, plus the
//! runtime override store and the [`ConfigProvider`] seam the match engine
//! reads from.
//!
//! ```rust
//! use qb_core::config::{ConfigProvider, GameConfig};
//! use qb_core::game::{ActionKind, Actor};
//!
//! let config = GameConfig::default();
//! assert!((config.probability(Actor::Player, ActionKind::Pass) - 0.80).abs() < 1e-9);
//! ```

mod env;
mod overrides;
mod provider;

pub use env::{load_from_env, CONFIG_PATH_ENV};
pub use overrides::ProbabilityOverrides;
pub use provider::{ConfigProvider, RuntimeConfig};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{ActionKind, Actor, DurationClass};

/// Probability used for any actor/action the configuration leaves unset.
pub const DEFAULT_PROBABILITY: f64 = 0.5;
pub const DEFAULT_MAX_PLAYER_ACTIONS: u32 = 100;

/// Inclusive range of total actions for a duration class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

impl DurationRange {
    pub fn is_valid(&self) -> bool {
        self.min <= self.max
    }

    pub fn contains(&self, value: u32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Per-action base probabilities for one actor. `None` means unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionProbabilities {
    pub pass: Option<f64>,
    pub dribble: Option<f64>,
    pub shoot: Option<f64>,
    pub tackle: Option<f64>,
}

impl ActionProbabilities {
    pub fn get(&self, action: ActionKind) -> Option<f64> {
        match action {
            ActionKind::Pass => self.pass,
            ActionKind::Dribble => self.dribble,
            ActionKind::Shoot => self.shoot,
            ActionKind::Tackle => self.tackle,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityConfig {
    #[serde(default)]
    pub player: ActionProbabilities,
    #[serde(default)]
    pub opponent: ActionProbabilities,
    #[serde(default)]
    pub goalkeeper_save: Option<f64>,
}

impl Default for ProbabilityConfig {
    fn default() -> Self {
        Self {
            player: ActionProbabilities {
                pass: Some(0.80),
                dribble: Some(0.60),
                shoot: Some(0.50),
                tackle: Some(0.75),
            },
            opponent: ActionProbabilities {
                pass: Some(0.70),
                dribble: Some(0.55),
                shoot: Some(0.45),
                tackle: Some(0.65),
            },
            goalkeeper_save: Some(0.50),
        }
    }
}

impl ProbabilityConfig {
    pub fn for_actor(&self, actor: Actor) -> &ActionProbabilities {
        match actor {
            Actor::Player => &self.player,
            Actor::Opponent => &self.opponent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    #[serde(default = "default_max_player_actions")]
    pub max_player_actions: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self { max_player_actions: DEFAULT_MAX_PLAYER_ACTIONS }
    }
}

fn default_max_player_actions() -> u32 {
    DEFAULT_MAX_PLAYER_ACTIONS
}

fn default_durations() -> BTreeMap<String, DurationRange> {
    [
        ("tiny", DurationRange { min: 10, max: 15 }),
        ("short", DurationRange { min: 40, max: 50 }),
        ("regular", DurationRange { min: 60, max: 90 }),
        ("long", DurationRange { min: 100, max: 120 }),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Startup configuration. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub probabilities: ProbabilityConfig,

    /// Operator overrides keyed `"<actor>_<action>"`; seeds the runtime store.
    #[serde(default)]
    pub variables: BTreeMap<String, Option<f64>>,

    #[serde(default)]
    pub game_rules: GameRules,

    #[serde(default = "default_durations")]
    pub game_duration: BTreeMap<String, DurationRange>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            probabilities: ProbabilityConfig::default(),
            variables: BTreeMap::new(),
            game_rules: GameRules::default(),
            game_duration: default_durations(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read, parse and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), "Loaded game config");
        Ok(config)
    }

    /// Check probabilities and override keys.
    ///
    /// Duration ranges are not rejected here: a malformed range falls back to
    /// the default budget when a match is created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for actor in Actor::ALL {
            let table = self.probabilities.for_actor(actor);
            for action in ActionKind::ALL {
                if let Some(p) = table.get(action) {
                    check_probability(&format!("probabilities.{actor}.{action}"), p)?;
                }
            }
        }
        if let Some(p) = self.probabilities.goalkeeper_save {
            check_probability("probabilities.goalkeeper_save", p)?;
        }
        for (key, value) in &self.variables {
            parse_variable_key(key)?;
            if let Some(p) = value {
                check_probability(&format!("variables.{key}"), *p)?;
            }
        }
        Ok(())
    }

    /// Variables with a value, parsed into typed keys.
    pub fn variable_overrides(&self) -> Result<Vec<(Actor, ActionKind, f64)>, ConfigError> {
        let mut out = Vec::new();
        for (key, value) in &self.variables {
            if let Some(p) = value {
                let (actor, action) = parse_variable_key(key)?;
                out.push((actor, action, *p));
            }
        }
        Ok(out)
    }
}

fn check_probability(field: &str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{field}: probability must be between 0.0 and 1.0, got {value}"
        )))
    }
}

fn parse_variable_key(key: &str) -> Result<(Actor, ActionKind), ConfigError> {
    let invalid = || ConfigError::Invalid(format!("Invalid variable key: {key}"));
    let (actor, action) = key.split_once('_').ok_or_else(invalid)?;
    let actor = actor.parse::<Actor>().map_err(|_| invalid())?;
    let action = action.parse::<ActionKind>().map_err(|_| invalid())?;
    Ok((actor, action))
}

impl ConfigProvider for GameConfig {
    fn probability(&self, actor: Actor, action: ActionKind) -> f64 {
        self.probabilities.for_actor(actor).get(action).unwrap_or(DEFAULT_PROBABILITY)
    }

    fn duration_ranges(&self) -> BTreeMap<DurationClass, DurationRange> {
        self.game_duration
            .iter()
            .filter_map(|(name, range)| name.parse::<DurationClass>().ok().map(|d| (d, *range)))
            .collect()
    }

    fn max_player_actions(&self) -> u32 {
        self.game_rules.max_player_actions
    }

    fn goalkeeper_save_probability(&self) -> f64 {
        self.probabilities.goalkeeper_save.unwrap_or(DEFAULT_PROBABILITY)
    }
}
