use super::avatar::swallow;
use super::store::{KeyValueStore, StorageError};
use crate::game::CombatContext;

const COMBAT_STATE_KEY: &str = "combat_state";

/// 会话级的战斗快照存储（浏览器中对应 `sessionStorage`）。
#[derive(Debug)]
pub struct CombatStore<S> {
    store: S,
}

impl<S: KeyValueStore> CombatStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save_combat_state(&self, context: &CombatContext) -> bool {
        let result = context
            .to_json()
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(COMBAT_STATE_KEY, &json));
        swallow("save combat state", result).is_some()
    }

    /// A missing or unreadable snapshot yields `None`.
    pub fn load_combat_state(&self) -> Option<CombatContext> {
        let raw = swallow("load combat state", self.store.get(COMBAT_STATE_KEY))??;
        swallow(
            "decode combat state",
            serde_json::from_str(&raw).map_err(StorageError::from),
        )
    }

    pub fn clear_combat_state(&self) {
        swallow("clear combat state", self.store.remove(COMBAT_STATE_KEY));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Turn, Winner};
    use crate::storage::store::{BrokenStore, MemoryStore};

    #[test]
    fn snapshot_round_trip() {
        let combat = CombatStore::new(MemoryStore::new());
        let context = CombatContext {
            player_hp: 64,
            opponent_hp: 0,
            current_turn: Turn::Player,
            winner: Some(Winner::Player),
            ..CombatContext::default()
        };
        assert!(combat.save_combat_state(&context));
        assert_eq!(combat.load_combat_state(), Some(context));

        combat.clear_combat_state();
        assert_eq!(combat.load_combat_state(), None);
    }

    #[test]
    fn garbage_snapshot_is_none() {
        let backing = MemoryStore::new();
        backing.set(COMBAT_STATE_KEY, "not json").expect("set");
        assert_eq!(CombatStore::new(&backing).load_combat_state(), None);
    }

    #[test]
    fn broken_backend_is_swallowed() {
        let combat = CombatStore::new(BrokenStore);
        assert!(!combat.save_combat_state(&CombatContext::default()));
        assert_eq!(combat.load_combat_state(), None);
        combat.clear_combat_state();
    }
}
