//! 持久化适配器：外观配置与战斗快照。

pub mod avatar;
pub mod combat;
pub mod store;

pub use avatar::{AvatarCustomization, AvatarStore};
pub use combat::CombatStore;
pub use store::{KeyValueStore, MemoryStore, StorageError, StorageKind, WebStorage};
