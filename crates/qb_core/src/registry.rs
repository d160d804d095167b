//! Match registry: identifier to match, one lock per match.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::ConfigProvider;
use crate::error::{CoreError, Result};
use crate::game::{DurationClass, MatchId, MatchState, Roll};

pub type SharedMatch = Arc<Mutex<MatchState>>;

/// Owns every match for the lifetime of the process. There is no removal.
///
/// The map lock is only held to insert or clone out a handle; mutation happens
/// under the match's own mutex, so different matches never wait on each other.
pub struct MatchRegistry {
    matches: RwLock<HashMap<MatchId, SharedMatch>>,
    config: Arc<dyn ConfigProvider>,
    max_player_actions: u32,
}

impl MatchRegistry {
    /// `max_player_actions` is read from `config` once, here.
    pub fn new(config: Arc<dyn ConfigProvider>) -> Self {
        let max_player_actions = config.max_player_actions();
        Self { matches: RwLock::new(HashMap::new()), config, max_player_actions }
    }

    pub fn config(&self) -> &dyn ConfigProvider {
        self.config.as_ref()
    }

    pub fn max_player_actions(&self) -> u32 {
        self.max_player_actions
    }

    /// Create and register a match with a fresh identifier.
    pub fn create_match<R: Roll + ?Sized>(
        &self,
        duration: DurationClass,
        roll: &mut R,
    ) -> SharedMatch {
        let id = MatchId::new();
        let range = self.config.duration_range(duration);
        let state = MatchState::new(id, duration, self.max_player_actions, range, roll);

        tracing::info!(
            match_id = %id,
            %duration,
            max_score = state.max_score(),
            max_actions = state.max_actions(),
            "Match created"
        );

        let handle = Arc::new(Mutex::new(state));
        // Entries are immutable handles, so the map is consistent even after a panic elsewhere.
        self.matches
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&handle));
        handle
    }

    pub fn get_match(&self, id: MatchId) -> Result<SharedMatch> {
        self.matches
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(format!("Game not found: {id}")))
    }

    /// Run `f` with exclusive access to one match.
    pub fn with_match<T>(
        &self,
        id: MatchId,
        f: impl FnOnce(&mut MatchState) -> Result<T>,
    ) -> Result<T> {
        let handle = self.get_match(id)?;
        let mut state = handle
            .lock()
            .map_err(|_| CoreError::Internal(format!("Match {id} lock poisoned")))?;
        f(&mut *state)
    }

    pub fn len(&self) -> usize {
        self.matches.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<MatchId> {
        let mut ids: Vec<MatchId> =
            self.matches.read().unwrap_or_else(PoisonError::into_inner).keys().copied().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DurationRange, GameConfig};
    use crate::game::ScriptedRoll;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn registry() -> MatchRegistry {
        MatchRegistry::new(Arc::new(GameConfig::default()))
    }

    #[test]
    fn test_create_and_get() {
        let registry = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let handle = registry.create_match(DurationClass::Regular, &mut rng);
        let id = handle.lock().unwrap().id();

        let found = registry.get_match(id).unwrap();
        assert!(Arc::ptr_eq(&handle, &found));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.ids(), vec![id]);
    }

    #[test]
    fn test_unknown_id_is_not_found() {
        let registry = registry();
        assert!(registry.is_empty());
        assert!(matches!(registry.get_match(MatchId::new()), Err(CoreError::NotFound(_))));
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..50 {
            registry.create_match(DurationClass::Tiny, &mut rng);
        }
        assert_eq!(registry.len(), 50);
    }

    #[test]
    fn test_max_player_actions_copied_from_config() {
        let config = GameConfig::from_json(r#"{"game_rules": {"max_player_actions": 12}}"#).unwrap();
        let registry = MatchRegistry::new(Arc::new(config));
        let handle = registry.create_match(DurationClass::Long, &mut ScriptedRoll::new([0.0]));
        let state = handle.lock().unwrap();
        assert_eq!(state.max_player_actions(), 12);
        assert_eq!(state.max_actions(), 100);
    }

    #[test]
    fn test_missing_duration_uses_fallback_range() {
        let config = GameConfig::from_json(
            r#"{"game_duration": {"regular": {"min": 1, "max": 2}}}"#,
        )
        .unwrap();
        let registry = MatchRegistry::new(Arc::new(config));
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let handle = registry.create_match(DurationClass::Tiny, &mut rng);
            let max_actions = handle.lock().unwrap().max_actions();
            assert!(DurationRange { min: 60, max: 90 }.contains(max_actions));
        }
    }

    #[test]
    fn test_with_match_gives_exclusive_access() {
        let registry = registry();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let id = registry.create_match(DurationClass::Regular, &mut rng).lock().unwrap().id();
        let total = registry
            .with_match(id, |m| {
                m.increment_total_action();
                Ok(m.total_action_count())
            })
            .unwrap();
        assert_eq!(total, 1);
    }
}
