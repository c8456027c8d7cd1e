use gemini_console_core::llm::catalog::compare_versions;
use gemini_console_core::llm::{find_model, ModelType};
use gemini_console_core::*;
use std::cmp::Ordering as CmpOrdering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Medium whose reads or writes can be switched to fail.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryKvStore,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl KeyValueStore for FlakyStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ConsoleError::persistence("medium unavailable"));
        }
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConsoleError::persistence("quota exceeded"));
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ConsoleError::persistence("quota exceeded"));
        }
        self.inner.remove(key)
    }
}

fn memory_store() -> ConversationStore {
    ConversationStore::new(Arc::new(MemoryKvStore::new()))
}

// ========================================================================
// Model catalog
// ========================================================================

#[test]
fn test_list_models_sorted_by_version_then_type() {
    let models = list_models();
    assert_eq!(models.len(), 8);

    for pair in models.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let by_version = compare_versions(&a.version, &b.version);
        assert_ne!(by_version, CmpOrdering::Less, "{} before {}", a.id, b.id);
        if by_version == CmpOrdering::Equal {
            assert!(a.model_type.priority() <= b.model_type.priority());
        }
    }

    assert_eq!(models[0].id, "gemini-2.0-pro");
    assert_eq!(models[4].id, "gemini-2.0-flash-lite");
    assert_eq!(models[5].id, "gemini-pro");
    assert_eq!(models[7].id, "gemini-pro-thinking");
}

#[test]
fn test_list_models_ids_unique() {
    let models = list_models();
    let ids: HashSet<&str> = models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids.len(), models.len());
}

#[test]
fn test_find_model() {
    let model = find_model("gemini-2.0-flash").unwrap();
    assert_eq!(model.name, "Gemini 2.0 Flash");
    assert_eq!(model.model_type, ModelType::Flash);
    assert_eq!(model.max_tokens, 32768);
    assert!(model.supported_methods.contains("generateText"));
    assert!(find_model("unknown").is_none());
}

// ========================================================================
// Scalar settings
// ========================================================================

#[test]
fn test_credential_roundtrip_and_validation() {
    let store = memory_store();
    assert_eq!(store.get_credential(), None);

    store.save_credential("  AIza-test-key  ").unwrap();
    assert_eq!(store.get_credential().as_deref(), Some("AIza-test-key"));

    let err = store.save_credential("   ").unwrap_err();
    assert!(matches!(err, ConsoleError::Config(_)));
    assert_eq!(store.get_credential().as_deref(), Some("AIza-test-key"));

    store.clear_credential().unwrap();
    assert_eq!(store.get_credential(), None);
    // Clearing twice is a no-op.
    store.clear_credential().unwrap();
}

#[test]
fn test_theme_flag_roundtrip() {
    let store = memory_store();
    assert!(!store.get_theme_flag());
    store.save_theme_flag(true).unwrap();
    assert!(store.get_theme_flag());
    store.save_theme_flag(false).unwrap();
    assert!(!store.get_theme_flag());
}

#[test]
fn test_selected_model_roundtrip() {
    let store = memory_store();
    assert_eq!(store.get_selected_model(), None);
    store.save_selected_model("gemini-pro").unwrap();
    assert_eq!(store.get_selected_model().as_deref(), Some("gemini-pro"));
}

// ========================================================================
// Parameters
// ========================================================================

#[test]
fn test_parameters_default_when_missing() {
    let store = memory_store();
    assert_eq!(store.get_parameters(), GenerationParameters::default());
}

#[test]
fn test_parameters_default_when_corrupt() {
    let medium = Arc::new(MemoryKvStore::new());
    medium.set("modelParameters", "{not json").unwrap();
    let store = ConversationStore::new(medium);
    assert_eq!(store.get_parameters(), GenerationParameters::default());
}

#[test]
fn test_parameters_missing_fields_take_defaults() {
    let medium = Arc::new(MemoryKvStore::new());
    medium.set("modelParameters", r#"{"temperature": 0.3}"#).unwrap();
    let store = ConversationStore::new(medium);

    let params = store.get_parameters();
    assert_eq!(params.temperature, 0.3);
    assert_eq!(params.top_p, 0.9);
    assert_eq!(params.top_k, 40);
    assert_eq!(params.max_tokens, 256);
}

#[test]
fn test_parameters_saved_as_whole_record() {
    let store = memory_store();
    let params = GenerationParameters {
        temperature: 1.2,
        top_p: 0.5,
        top_k: 10,
        max_tokens: 2048,
    };
    store.save_parameters(&params).unwrap();
    assert_eq!(store.get_parameters(), params);
}

#[test]
fn test_save_parameters_reports_write_failure() {
    let medium = Arc::new(FlakyStore::default());
    let store = ConversationStore::new(medium.clone());
    medium.fail_writes.store(true, Ordering::SeqCst);

    let err = store
        .save_parameters(&GenerationParameters::default())
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Persistence(_)));
}

// ========================================================================
// Conversation log
// ========================================================================

#[test]
fn test_append_assigns_id_and_timestamp() {
    let store = memory_store();
    let mut conv = Conversation::from_exchange("Hello", "Hi!", "gemini-pro");
    conv.id = "caller-id".to_string();
    conv.timestamp = "1999-01-01T00:00:00Z".to_string();

    let stored = store.append_conversation(conv).unwrap();
    assert_ne!(stored.id, "caller-id");
    assert_ne!(stored.timestamp, "1999-01-01T00:00:00Z");
    assert!(stored.id.parse::<i64>().is_ok());

    let log = store.get_conversations();
    assert_eq!(log, vec![stored]);
}

#[test]
fn test_append_evicts_oldest_past_fifty() {
    let store = memory_store();
    for i in 1..=51 {
        store
            .append_conversation(Conversation::from_exchange(
                format!("message {i}"),
                "reply",
                "gemini-pro",
            ))
            .unwrap();
    }

    let log = store.get_conversations();
    assert_eq!(log.len(), 50);
    assert_eq!(log[0].title, "message 2");
    assert_eq!(log[49].title, "message 51");

    let ids: HashSet<&str> = log.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
}

#[test]
fn test_append_failure_leaves_log_unchanged() {
    let medium = Arc::new(FlakyStore::default());
    let store = ConversationStore::new(medium.clone());
    store
        .append_conversation(Conversation::from_exchange("first", "one", "gemini-pro"))
        .unwrap();
    let before = store.get_conversations();

    medium.fail_writes.store(true, Ordering::SeqCst);
    let err = store
        .append_conversation(Conversation::from_exchange("second", "two", "gemini-pro"))
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Persistence(_)));

    medium.fail_writes.store(false, Ordering::SeqCst);
    assert_eq!(store.get_conversations(), before);
}

#[test]
fn test_append_over_quota_leaves_log_unchanged() {
    let store = ConversationStore::new(Arc::new(MemoryKvStore::new().with_quota(1024)));
    store
        .append_conversation(Conversation::from_exchange("small", "reply", "gemini-pro"))
        .unwrap();
    let before = store.get_conversations();

    let huge = "x".repeat(4096);
    let result = store.append_conversation(Conversation::from_exchange("big", huge, "gemini-pro"));
    assert!(matches!(result, Err(ConsoleError::Persistence(_))));
    assert_eq!(store.get_conversations(), before);
}

#[test]
fn test_get_conversation_by_id() {
    let store = memory_store();
    let stored = store
        .append_conversation(Conversation::from_exchange("find me", "ok", "gemini-pro"))
        .unwrap();

    assert_eq!(store.get_conversation_by_id(&stored.id), Some(stored));
    assert_eq!(store.get_conversation_by_id("missing"), None);
}

#[test]
fn test_delete_conversation() {
    let store = memory_store();
    let a = store
        .append_conversation(Conversation::from_exchange("a", "1", "gemini-pro"))
        .unwrap();
    let b = store
        .append_conversation(Conversation::from_exchange("b", "2", "gemini-pro"))
        .unwrap();

    store.delete_conversation(&a.id).unwrap();
    assert_eq!(store.get_conversations(), vec![b.clone()]);

    // Unknown id is a no-op.
    store.delete_conversation("does-not-exist").unwrap();
    assert_eq!(store.get_conversations(), vec![b]);
}

#[test]
fn test_clear_conversations_keeps_settings() {
    let store = memory_store();
    store.save_selected_model("gemini-pro").unwrap();
    store
        .append_conversation(Conversation::from_exchange("a", "1", "gemini-pro"))
        .unwrap();

    store.clear_conversations().unwrap();
    assert!(store.get_conversations().is_empty());
    assert_eq!(store.get_selected_model().as_deref(), Some("gemini-pro"));
}

#[test]
fn test_corrupt_log_reads_as_empty() {
    let medium = Arc::new(MemoryKvStore::new());
    medium.set("conversations", "[{\"broken\": ").unwrap();
    let store = ConversationStore::new(medium);
    assert!(store.get_conversations().is_empty());
}

#[test]
fn test_failed_reads_degrade_to_defaults() {
    let medium = Arc::new(FlakyStore::default());
    let store = ConversationStore::new(medium.clone());
    store.save_credential("key").unwrap();
    store.save_theme_flag(true).unwrap();

    medium.fail_reads.store(true, Ordering::SeqCst);
    assert_eq!(store.get_credential(), None);
    assert!(!store.get_theme_flag());
    assert_eq!(store.get_parameters(), GenerationParameters::default());
    assert!(store.get_conversations().is_empty());
}

#[test]
fn test_clear_all_restores_defaults() {
    let medium = Arc::new(MemoryKvStore::new());
    let store = ConversationStore::new(medium.clone());
    store.save_credential("key").unwrap();
    store.save_theme_flag(true).unwrap();
    store.save_selected_model("gemini-pro").unwrap();
    store
        .save_parameters(&GenerationParameters {
            temperature: 1.0,
            top_p: 0.1,
            top_k: 1,
            max_tokens: 1,
        })
        .unwrap();
    store
        .append_conversation(Conversation::from_exchange("a", "1", "gemini-pro"))
        .unwrap();

    store.clear_all().unwrap();

    assert_eq!(store.get_credential(), None);
    assert!(!store.get_theme_flag());
    assert_eq!(store.get_selected_model(), None);
    assert_eq!(store.get_parameters(), GenerationParameters::default());
    assert!(store.get_conversations().is_empty());
    assert!(medium.is_empty());
}

#[test]
fn test_is_available() {
    let store = memory_store();
    assert!(store.is_available());

    let medium = Arc::new(FlakyStore::default());
    let flaky = ConversationStore::new(medium.clone());
    medium.fail_writes.store(true, Ordering::SeqCst);
    assert!(!flaky.is_available());

    let full = ConversationStore::new(Arc::new(MemoryKvStore::new().with_quota(0)));
    assert!(!full.is_available());
}

#[test]
fn test_is_available_leaves_no_probe_key() {
    let medium = Arc::new(MemoryKvStore::new());
    let store = ConversationStore::new(medium.clone());
    assert!(store.is_available());
    assert!(medium.is_empty());
}

#[test]
fn test_concurrent_appends_respect_bound() {
    let store = Arc::new(memory_store());
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let store = store.clone();
            std::thread::spawn(move || {
                for i in 0..20 {
                    store
                        .append_conversation(Conversation::from_exchange(
                            format!("thread {t} message {i}"),
                            "reply",
                            "gemini-pro",
                        ))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let log = store.get_conversations();
    assert_eq!(log.len(), 50);
    let ids: HashSet<&str> = log.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids.len(), 50);
}

// ========================================================================
// File-backed medium
// ========================================================================

#[test]
fn test_file_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();

    let stored = {
        let store = ConversationStore::new(Arc::new(FileKvStore::with_dir(temp.path()).unwrap()));
        store.save_credential("persisted-key").unwrap();
        store.save_theme_flag(true).unwrap();
        store
            .append_conversation(Conversation::from_exchange("keep me", "kept", "gemini-pro"))
            .unwrap()
    };

    let reopened = ConversationStore::new(Arc::new(FileKvStore::with_dir(temp.path()).unwrap()));
    assert_eq!(reopened.get_credential().as_deref(), Some("persisted-key"));
    assert!(reopened.get_theme_flag());
    assert_eq!(reopened.get_conversations(), vec![stored]);
}

#[test]
fn test_file_store_log_is_json_array() {
    let temp = TempDir::new().unwrap();
    let store = ConversationStore::new(Arc::new(FileKvStore::with_dir(temp.path()).unwrap()));
    store
        .append_conversation(Conversation::from_exchange("hello", "world", "gemini-pro"))
        .unwrap();

    let raw = std::fs::read_to_string(temp.path().join("conversations.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["messages"][0]["role"], "user");
    assert_eq!(entries[0]["messages"][1]["role"], "assistant");
    assert_eq!(entries[0]["model"], "gemini-pro");
}
