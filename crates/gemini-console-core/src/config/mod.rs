use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::constants::{defaults, endpoints, paths, retry};
use crate::error::ConsoleError;
use crate::llm::{GeminiClient, RetryPolicy};
use crate::storage::{ConversationStore, FileKvStore, KeyValueStore, MemoryKvStore};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConsoleConfig {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Environment variable consulted when no API key is stored.
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub default_delay_secs: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StorageSettings {
    /// Overrides the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: endpoints::GEMINI_BASE_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            api_key_env: endpoints::API_KEY_ENV.to_string(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: retry::MAX_ATTEMPTS,
            default_delay_secs: retry::DEFAULT_RETRY_AFTER_SECS,
        }
    }
}

impl ConsoleConfig {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read a config file, falling back to defaults when it is missing or invalid.
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults"),
                },
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults"),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), ConsoleError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConsoleError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ConsoleError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Read the API key from the environment variable named in settings.
    pub fn api_key_from_env(&self) -> Option<String> {
        std::env::var(&self.api.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn data_dir(&self) -> PathBuf {
        self.storage.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(paths::DATA_DIR)
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::default()
            .with_max_attempts(self.retry.max_attempts)
            .with_default_delay(Duration::from_secs(self.retry.default_delay_secs))
    }

    pub fn build_client(&self, api_key: impl Into<String>) -> Result<GeminiClient, ConsoleError> {
        GeminiClient::new(api_key)
            .with_base_url(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
    }

    /// Open the conversation store on disk. If the data directory cannot be
    /// used, history is kept in memory for this run only.
    pub fn open_store(&self) -> ConversationStore {
        let medium: Arc<dyn KeyValueStore> = match FileKvStore::with_dir(self.data_dir()) {
            Ok(store) => Arc::new(store),
            Err(e) => {
                tracing::warn!(error = %e, "data directory unavailable, using in-memory storage");
                Arc::new(MemoryKvStore::new())
            }
        };
        ConversationStore::new(medium)
    }
}
