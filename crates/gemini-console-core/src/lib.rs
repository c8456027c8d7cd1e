pub mod error;
pub mod constants;
pub mod llm;
pub mod storage;
pub mod config;

// Re-export key types
pub use error::{ConsoleError, Result};
pub use llm::{
    list_models, parse_response, with_rate_limit_retry, GeminiClient, GenerationClient,
    GenerationParameters, Message, ModelDescriptor, RetryPolicy, Role,
};
pub use storage::{Conversation, ConversationStore, FileKvStore, KeyValueStore, MemoryKvStore};
pub use config::ConsoleConfig;
