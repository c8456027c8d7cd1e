mod traits;
mod gemini;
pub mod catalog;
pub mod retry;

pub use traits::*;
pub use gemini::{parse_response, parse_retry_after, GeminiClient, GenerateContentRequest};
pub use catalog::{find_model, list_models, require_model, ModelDescriptor, ModelType};
pub use retry::{with_rate_limit_retry, RetryPolicy};
