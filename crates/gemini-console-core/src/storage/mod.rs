mod kv;
mod store;
pub mod conversation;

pub use kv::{FileKvStore, KeyValueStore, MemoryKvStore};
pub use store::ConversationStore;
pub use conversation::{derive_title, Conversation};
