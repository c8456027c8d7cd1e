use crate::constants::defaults;
use crate::error::ConsoleError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Role name the generation endpoint expects in a content block.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "model",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling controls sent with every request.
///
/// Fields missing from a stored record deserialize to their defaults.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationParameters {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            temperature: defaults::TEMPERATURE,
            top_p: defaults::TOP_P,
            top_k: defaults::TOP_K,
            max_tokens: defaults::MAX_TOKENS,
        }
    }
}

impl GenerationParameters {
    /// Replace zero, negative or non-finite fields with their defaults.
    pub fn sanitized(&self) -> Self {
        let fallback = Self::default();
        let positive = |v: f32, d: f32| if v.is_finite() && v > 0.0 { v } else { d };
        Self {
            temperature: positive(self.temperature, fallback.temperature),
            top_p: positive(self.top_p, fallback.top_p),
            top_k: if self.top_k > 0 { self.top_k } else { fallback.top_k },
            max_tokens: if self.max_tokens > 0 {
                self.max_tokens
            } else {
                fallback.max_tokens
            },
        }
    }
}

/// A text-generation backend. `GeminiClient` is the production implementation.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Single-turn generation from one user prompt.
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, ConsoleError>;

    /// Generation with the prior turns of a conversation sent ahead of `prompt`.
    async fn chat(
        &self,
        model_id: &str,
        history: &[Message],
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String, ConsoleError>;
}
