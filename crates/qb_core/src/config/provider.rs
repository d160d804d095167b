use std::collections::BTreeMap;

use super::{DurationRange, GameConfig, ProbabilityOverrides};
use crate::error::{ConfigError, Result};
use crate::game::{ActionKind, Actor, DurationClass};

/// Source of base probabilities and match limits.
pub trait ConfigProvider: Send + Sync {
    /// Base success probability in `[0, 1]`; 0.5 when unset.
    fn probability(&self, actor: Actor, action: ActionKind) -> f64;

    fn duration_ranges(&self) -> BTreeMap<DurationClass, DurationRange>;

    fn duration_range(&self, duration: DurationClass) -> Option<DurationRange> {
        self.duration_ranges().get(&duration).copied()
    }

    fn max_player_actions(&self) -> u32;

    fn goalkeeper_save_probability(&self) -> f64;
}

/// Startup configuration layered under the runtime override store.
#[derive(Debug)]
pub struct RuntimeConfig {
    base: GameConfig,
    overrides: ProbabilityOverrides,
}

impl RuntimeConfig {
    /// Validate a startup config and seed overrides from its `variables`.
    pub fn new(base: GameConfig) -> std::result::Result<Self, ConfigError> {
        base.validate()?;
        let overrides = ProbabilityOverrides::new();
        for (actor, action, value) in base.variable_overrides()? {
            overrides
                .set(actor, action, Some(value))
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        }
        Ok(Self { base, overrides })
    }

    pub fn base(&self) -> &GameConfig {
        &self.base
    }

    pub fn overrides(&self) -> &ProbabilityOverrides {
        &self.overrides
    }

    pub fn set_override(&self, actor: Actor, action: ActionKind, value: Option<f64>) -> Result<()> {
        self.overrides.set(actor, action, value)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { base: GameConfig::default(), overrides: ProbabilityOverrides::new() }
    }
}

impl ConfigProvider for RuntimeConfig {
    fn probability(&self, actor: Actor, action: ActionKind) -> f64 {
        self.overrides.get(actor, action).unwrap_or_else(|| self.base.probability(actor, action))
    }

    fn duration_ranges(&self) -> BTreeMap<DurationClass, DurationRange> {
        self.base.duration_ranges()
    }

    fn max_player_actions(&self) -> u32 {
        self.base.max_player_actions()
    }

    fn goalkeeper_save_probability(&self) -> f64 {
        self.base.goalkeeper_save_probability()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_shadows_base() {
        let cfg = RuntimeConfig::default();
        assert!((cfg.probability(Actor::Player, ActionKind::Pass) - 0.80).abs() < 1e-9);

        cfg.set_override(Actor::Player, ActionKind::Pass, Some(0.3)).unwrap();
        assert!((cfg.probability(Actor::Player, ActionKind::Pass) - 0.3).abs() < 1e-9);

        cfg.set_override(Actor::Player, ActionKind::Pass, None).unwrap();
        assert!((cfg.probability(Actor::Player, ActionKind::Pass) - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_variables_seed_overrides() {
        let base = GameConfig::from_json(r#"{"variables": {"opponent_shoot": 0.2}}"#).unwrap();
        let cfg = RuntimeConfig::new(base).unwrap();
        assert!((cfg.probability(Actor::Opponent, ActionKind::Shoot) - 0.2).abs() < 1e-9);
        // startup table is untouched
        assert!((cfg.base().probability(Actor::Opponent, ActionKind::Shoot) - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_variable_rejected() {
        let base = GameConfig::from_json(r#"{"variables": {"player_pass": 2.0}}"#).unwrap();
        assert!(RuntimeConfig::new(base).is_err());
    }

    #[test]
    fn test_out_of_range_base_probability_rejected() {
        let base =
            GameConfig::from_json(r#"{"probabilities": {"player": {"pass": 1.5}}}"#).unwrap();
        assert!(matches!(RuntimeConfig::new(base), Err(ConfigError::Invalid(_))));

        let base =
            GameConfig::from_json(r#"{"probabilities": {"opponent": {"shoot": -0.4}}}"#).unwrap();
        assert!(matches!(RuntimeConfig::new(base), Err(ConfigError::Invalid(_))));

        let base = GameConfig::from_json(r#"{"variables": {"coach_pass": 0.5}}"#).unwrap();
        assert!(matches!(RuntimeConfig::new(base), Err(ConfigError::Invalid(_))));
    }
}
