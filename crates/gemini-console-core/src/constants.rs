/// Gemini Console - centralized constants.
/// Endpoints, defaults, storage keys and limits live here.

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1";
    pub const GENERATE_CONTENT_METHOD: &str = "generateContent";
    pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
}

// ─── Generation Defaults ──────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f32 = 0.7;
    pub const TOP_P: f32 = 0.9;
    pub const TOP_K: u32 = 40;
    pub const MAX_TOKENS: u32 = 256;
    pub const REQUEST_TIMEOUT_SECS: u64 = 120;
}

// ─── Retry ────────────────────────────────────────────────────────────────────

pub mod retry {
    pub const MAX_ATTEMPTS: u32 = 3;
    pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;
    pub const RETRY_AFTER_HEADER: &str = "retry-after";
}

// ─── Storage Keys ─────────────────────────────────────────────────────────────

pub mod keys {
    pub const API_KEY: &str = "geminiApiKey";
    pub const DARK_MODE: &str = "darkMode";
    pub const CONVERSATIONS: &str = "conversations";
    pub const SELECTED_MODEL: &str = "selectedModel";
    pub const PARAMETERS: &str = "modelParameters";
    pub const PROBE: &str = "__storage_test__";

    /// Every key owned by the conversation store, in `clear_all` order.
    pub const ALL: &[&str] = &[API_KEY, DARK_MODE, CONVERSATIONS, SELECTED_MODEL, PARAMETERS];
}

// ─── Limits ───────────────────────────────────────────────────────────────────

pub mod limits {
    pub const MAX_CONVERSATIONS: usize = 50;
    pub const TITLE_MAX_CHARS: usize = 50;
    /// A title is only cut back to a word boundary past this index.
    pub const TITLE_MIN_WORD_CUT: usize = 30;
    pub const TITLE_ELLIPSIS: &str = "...";
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "gemini-console";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const DATA_DIR: &str = "gemini-console";
}
