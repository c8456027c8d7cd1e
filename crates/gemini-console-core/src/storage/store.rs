use crate::constants::{keys, limits};
use crate::error::{ConsoleError, Result};
use crate::llm::GenerationParameters;
use crate::storage::conversation::{now_timestamp, Conversation};
use crate::storage::kv::KeyValueStore;
use chrono::Utc;
use std::sync::{Arc, Mutex};

/// Settings and the bounded conversation log, persisted in a key-value medium.
///
/// Reads never fail: missing or corrupt records degrade to defaults. Writes
/// surface medium failures as `ConsoleError::Persistence`. Log mutations are
/// serialized so concurrent appends cannot lose entries or break the bound.
pub struct ConversationStore {
    medium: Arc<dyn KeyValueStore>,
    log_lock: Mutex<()>,
}

impl ConversationStore {
    pub fn new(medium: Arc<dyn KeyValueStore>) -> Self {
        Self {
            medium,
            log_lock: Mutex::new(()),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.medium.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed, using default");
                None
            }
        }
    }

    // ─── Scalars ─────────────────────────────────────────────────────────────

    pub fn get_credential(&self) -> Option<String> {
        self.read(keys::API_KEY).filter(|key| !key.trim().is_empty())
    }

    pub fn save_credential(&self, credential: &str) -> Result<()> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(ConsoleError::Config("API key must not be empty".into()));
        }
        self.medium.set(keys::API_KEY, credential)
    }

    pub fn clear_credential(&self) -> Result<()> {
        self.medium.remove(keys::API_KEY)
    }

    pub fn get_theme_flag(&self) -> bool {
        self.read(keys::DARK_MODE).as_deref() == Some("true")
    }

    pub fn save_theme_flag(&self, dark: bool) -> Result<()> {
        self.medium
            .set(keys::DARK_MODE, if dark { "true" } else { "false" })
    }

    pub fn get_selected_model(&self) -> Option<String> {
        self.read(keys::SELECTED_MODEL).filter(|id| !id.is_empty())
    }

    pub fn save_selected_model(&self, model_id: &str) -> Result<()> {
        self.medium.set(keys::SELECTED_MODEL, model_id)
    }

    // ─── Parameters ──────────────────────────────────────────────────────────

    pub fn get_parameters(&self) -> GenerationParameters {
        let Some(raw) = self.read(keys::PARAMETERS) else {
            return GenerationParameters::default();
        };
        match serde_json::from_str::<GenerationParameters>(&raw) {
            Ok(params) => params.sanitized(),
            Err(e) => {
                tracing::warn!(error = %e, "stored parameters are corrupt, using defaults");
                GenerationParameters::default()
            }
        }
    }

    /// Replace the stored parameter record as a whole.
    pub fn save_parameters(&self, parameters: &GenerationParameters) -> Result<()> {
        let contents = serde_json::to_string(parameters).map_err(|e| {
            ConsoleError::persistence(format!("Failed to serialize parameters: {e}"))
        })?;
        self.medium.set(keys::PARAMETERS, &contents)
    }

    // ─── Conversation log ────────────────────────────────────────────────────

    /// The log, oldest first.
    pub fn get_conversations(&self) -> Vec<Conversation> {
        let Some(raw) = self.read(keys::CONVERSATIONS) else {
            return Vec::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "stored conversations are corrupt, ignoring");
            Vec::new()
        })
    }

    fn write_log(&self, log: &[Conversation]) -> Result<()> {
        let contents = serde_json::to_string(log).map_err(|e| {
            ConsoleError::persistence(format!("Failed to serialize conversations: {e}"))
        })?;
        self.medium.set(keys::CONVERSATIONS, &contents)
    }

    /// Append `conversation` with a fresh id and timestamp, evicting the
    /// oldest entry once the log exceeds its bound. Returns the stored record.
    pub fn append_conversation(&self, mut conversation: Conversation) -> Result<Conversation> {
        let _guard = self.log_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut log = self.get_conversations();

        conversation.id = next_id(&log)?;
        conversation.timestamp = now_timestamp();
        log.push(conversation.clone());

        if log.len() > limits::MAX_CONVERSATIONS {
            let evicted = log.remove(0);
            tracing::debug!(id = %evicted.id, "evicted oldest conversation");
        }

        self.write_log(&log)?;
        Ok(conversation)
    }

    pub fn get_conversation_by_id(&self, id: &str) -> Option<Conversation> {
        self.get_conversations().into_iter().find(|c| c.id == id)
    }

    /// Remove the conversation with `id`; absent ids are a no-op.
    pub fn delete_conversation(&self, id: &str) -> Result<()> {
        let _guard = self.log_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut log = self.get_conversations();
        log.retain(|c| c.id != id);
        self.write_log(&log)
    }

    pub fn clear_conversations(&self) -> Result<()> {
        let _guard = self.log_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.write_log(&[])
    }

    /// Remove every key this store owns.
    pub fn clear_all(&self) -> Result<()> {
        let _guard = self.log_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut first_error = None;
        for key in keys::ALL {
            if let Err(e) = self.medium.remove(key) {
                tracing::warn!(key, error = %e, "failed to remove stored key");
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Whether the medium accepts a throwaway write and delete.
    pub fn is_available(&self) -> bool {
        self.medium.set(keys::PROBE, keys::PROBE).is_ok() && self.medium.remove(keys::PROBE).is_ok()
    }
}

/// Millisecond timestamp id, bumped past the newest id in `log` so appends
/// within the same millisecond stay unique.
fn next_id(log: &[Conversation]) -> Result<String> {
    let now = Utc::now().timestamp_millis();
    let newest = log.iter().filter_map(|c| c.id.parse::<i64>().ok()).max();
    match newest {
        Some(n) if n >= now => n
            .checked_add(1)
            .map(|id| id.to_string())
            .ok_or_else(|| ConsoleError::persistence(format!("No conversation id left after {n}"))),
        _ => Ok(now.to_string()),
    }
}
