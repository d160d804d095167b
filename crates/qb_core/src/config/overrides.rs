//! Runtime-tunable probability overrides.
//!
//! Kept apart from the startup [`GameConfig`](super::GameConfig): operators can
//! change these while matches run, and nothing is written back to disk.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{CoreError, Result};
use crate::game::{ActionKind, Actor};

#[derive(Debug, Default)]
pub struct ProbabilityOverrides {
    values: RwLock<BTreeMap<(Actor, ActionKind), f64>>,
}

impl ProbabilityOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: Actor, action: ActionKind) -> Option<f64> {
        // The map holds plain values, so a poisoned lock still has consistent data.
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        values.get(&(actor, action)).copied()
    }

    /// Set an override, or clear it with `None`.
    pub fn set(&self, actor: Actor, action: ActionKind, value: Option<f64>) -> Result<()> {
        let mut values = self.values.write().unwrap_or_else(PoisonError::into_inner);
        match value {
            Some(p) if !(0.0..=1.0).contains(&p) => {
                return Err(CoreError::InvalidArgument(format!(
                    "Probability must be between 0.0 and 1.0, got {p}"
                )));
            }
            Some(p) => {
                values.insert((actor, action), p);
                tracing::info!(%actor, %action, probability = p, "Probability override set");
            }
            None => {
                if values.remove(&(actor, action)).is_some() {
                    tracing::info!(%actor, %action, "Probability override cleared");
                }
            }
        }
        Ok(())
    }

    /// Copy of every active override
    pub fn snapshot(&self) -> BTreeMap<(Actor, ActionKind), f64> {
        self.values.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let overrides = ProbabilityOverrides::new();
        assert_eq!(overrides.get(Actor::Player, ActionKind::Pass), None);

        overrides.set(Actor::Player, ActionKind::Pass, Some(0.9)).unwrap();
        assert_eq!(overrides.get(Actor::Player, ActionKind::Pass), Some(0.9));
        assert_eq!(overrides.get(Actor::Opponent, ActionKind::Pass), None);

        overrides.set(Actor::Player, ActionKind::Pass, None).unwrap();
        assert_eq!(overrides.get(Actor::Player, ActionKind::Pass), None);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let overrides = ProbabilityOverrides::new();
        let err = overrides.set(Actor::Opponent, ActionKind::Shoot, Some(-0.1)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert!(overrides.snapshot().is_empty());
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let overrides = ProbabilityOverrides::new();
        assert!(overrides.set(Actor::Player, ActionKind::Shoot, Some(0.0)).is_ok());
        assert!(overrides.set(Actor::Player, ActionKind::Tackle, Some(1.0)).is_ok());
        assert_eq!(overrides.snapshot().len(), 2);
    }
}
