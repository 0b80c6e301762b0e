use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::store::{KeyValueStore, StorageError};

const KEY_PREFIX: &str = "avatar_customization:";
const PROBE_KEY: &str = "avatar_customization__probe";

/// 角色外观配置。
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AvatarCustomization {
    pub body_parts: BTreeMap<String, String>,
    pub colors: BTreeMap<String, String>,
    pub accessories: Vec<String>,
}

fn key_for(avatar_id: &str) -> String {
    format!("{KEY_PREFIX}{avatar_id}")
}

/// 外观持久化适配器；底层错误一律吞掉并降级为空结果。
#[derive(Debug)]
pub struct AvatarStore<S> {
    store: S,
}

impl<S: KeyValueStore> AvatarStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn save_customization(&self, avatar_id: &str, data: &AvatarCustomization) -> bool {
        let result = serde_json::to_string(data)
            .map_err(StorageError::from)
            .and_then(|json| self.store.set(&key_for(avatar_id), &json));
        swallow("save avatar customization", result).is_some()
    }

    pub fn load_customization(&self, avatar_id: &str) -> Option<AvatarCustomization> {
        let raw = swallow(
            "load avatar customization",
            self.store.get(&key_for(avatar_id)),
        )??;
        swallow(
            "decode avatar customization",
            serde_json::from_str(&raw).map_err(StorageError::from),
        )
    }

    pub fn clear_customization(&self, avatar_id: &str) {
        swallow(
            "clear avatar customization",
            self.store.remove(&key_for(avatar_id)),
        );
    }

    pub fn get_all_avatar_ids(&self) -> Vec<String> {
        swallow("list avatar ids", self.store.keys())
            .unwrap_or_default()
            .into_iter()
            .filter_map(|key| key.strip_prefix(KEY_PREFIX).map(str::to_owned))
            .collect()
    }

    /// 只清除外观相关的键。
    pub fn clear_all(&self) {
        for avatar_id in self.get_all_avatar_ids() {
            self.clear_customization(&avatar_id);
        }
    }

    pub fn is_available(&self) -> bool {
        self.store.set(PROBE_KEY, "1").is_ok() && self.store.remove(PROBE_KEY).is_ok()
    }
}

pub(crate) fn swallow<T>(operation: &str, result: Result<T, StorageError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("{operation} failed: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::store::{BrokenStore, MemoryStore};

    fn knight() -> AvatarCustomization {
        AvatarCustomization {
            body_parts: BTreeMap::from([("head".to_owned(), "helm_02".to_owned())]),
            colors: BTreeMap::from([("primary".to_owned(), "#3366ff".to_owned())]),
            accessories: vec!["cape".to_owned()],
        }
    }

    #[test]
    fn save_then_load() {
        let avatars = AvatarStore::new(MemoryStore::new());
        assert!(avatars.save_customization("hero", &knight()));
        assert_eq!(avatars.load_customization("hero"), Some(knight()));
        assert_eq!(avatars.load_customization("nobody"), None);
    }

    #[test]
    fn ids_and_clear_all_only_touch_avatar_keys() {
        let backing = MemoryStore::new();
        backing.set("unrelated", "keep me").expect("set");
        let avatars = AvatarStore::new(&backing);
        avatars.save_customization("a", &knight());
        avatars.save_customization("b", &AvatarCustomization::default());

        let mut ids = avatars.get_all_avatar_ids();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);

        avatars.clear_all();
        assert!(avatars.get_all_avatar_ids().is_empty());
        assert_eq!(backing.get("unrelated").expect("get"), Some("keep me".into()));
    }

    #[test]
    fn clear_customization_removes_one() {
        let avatars = AvatarStore::new(MemoryStore::new());
        avatars.save_customization("a", &knight());
        avatars.clear_customization("a");
        assert_eq!(avatars.load_customization("a"), None);
    }

    #[test]
    fn corrupt_entry_loads_as_none() {
        let backing = MemoryStore::new();
        backing.set(&key_for("x"), "{{{").expect("set");
        let avatars = AvatarStore::new(&backing);
        assert_eq!(avatars.load_customization("x"), None);
    }

    #[test]
    fn broken_backend_degrades_silently() {
        let avatars = AvatarStore::new(BrokenStore);
        assert!(!avatars.is_available());
        assert!(!avatars.save_customization("a", &knight()));
        assert_eq!(avatars.load_customization("a"), None);
        assert!(avatars.get_all_avatar_ids().is_empty());
        avatars.clear_customization("a");
        avatars.clear_all();
    }

    #[test]
    fn memory_backend_is_available() {
        let backing = MemoryStore::new();
        let avatars = AvatarStore::new(&backing);
        assert!(avatars.is_available());
        assert!(backing.is_empty());
    }
}
