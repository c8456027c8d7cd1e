use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The endpoint rejected the request, or the transport failed before a
    /// status was received (`status` is `None` then).
    #[error("Generation error: {message}")]
    Generation {
        status: Option<u16>,
        message: String,
        retry_after: Option<Duration>,
    },

    #[error("No response generated")]
    EmptyResponse,

    #[error("Invalid response format: {0}")]
    MalformedResponse(String),

    #[error("Model list error: {0}")]
    ModelList(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConsoleError {
    pub fn generation(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Generation {
            status,
            message: message.into(),
            retry_after: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::Generation {
            status: Some(429),
            message: message.into(),
            retry_after,
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// True for HTTP 429, the only condition `with_rate_limit_retry` retries.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Generation { status: Some(429), .. })
    }

    /// Server-supplied wait hint, if the error carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::Generation { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Generation { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ConsoleError {
    fn from(err: reqwest::Error) -> Self {
        Self::generation(
            err.status().map(|s| s.as_u16()),
            format!("Request failed: {err}"),
        )
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
