//! Static Gemini model catalog.
//!
//! The console does not query the endpoint for models; the table below is the
//! single source of model ids, names and limits.

use crate::error::{ConsoleError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelType {
    Pro,
    ProVision,
    ProThinking,
    Flash,
    FlashLite,
    #[serde(other)]
    Unknown,
}

impl ModelType {
    /// Position within one version group; lower sorts first.
    pub fn priority(&self) -> u8 {
        match self {
            ModelType::Pro => 1,
            ModelType::ProVision => 2,
            ModelType::ProThinking => 3,
            ModelType::Flash => 4,
            ModelType::FlashLite => 5,
            ModelType::Unknown => 99,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub description: String,
    pub max_tokens: u32,
    pub supported_methods: BTreeSet<String>,
}

struct CatalogEntry {
    id: &'static str,
    name: &'static str,
    version: &'static str,
    model_type: ModelType,
    description: &'static str,
    max_tokens: u32,
    methods: &'static [&'static str],
}

const GENERATE_TEXT: &[&str] = &["generateText"];

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "gemini-2.0-pro",
        name: "Gemini 2.0 Pro",
        version: "2.0",
        model_type: ModelType::Pro,
        description: "Latest generation model for advanced text generation and analysis",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-2.0-pro-vision",
        name: "Gemini 2.0 Pro Vision",
        version: "2.0",
        model_type: ModelType::ProVision,
        description: "Latest generation model for advanced image and text analysis",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-2.0-pro-thinking",
        name: "Gemini 2.0 Pro Thinking",
        version: "2.0",
        model_type: ModelType::ProThinking,
        description: "Latest generation model optimized for complex reasoning tasks",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-2.0-flash",
        name: "Gemini 2.0 Flash",
        version: "2.0",
        model_type: ModelType::Flash,
        description: "High-speed model for quick responses",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-2.0-flash-lite",
        name: "Gemini 2.0 Flash Lite",
        version: "2.0",
        model_type: ModelType::FlashLite,
        description: "Lightweight version of Flash model for faster processing",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-pro",
        name: "Gemini Pro",
        version: "1.0",
        model_type: ModelType::Pro,
        description: "Standard model for text generation and analysis",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-pro-vision",
        name: "Gemini Pro Vision",
        version: "1.0",
        model_type: ModelType::ProVision,
        description: "Standard model for image and text analysis",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
    CatalogEntry {
        id: "gemini-pro-thinking",
        name: "Gemini Pro Thinking",
        version: "1.0",
        model_type: ModelType::ProThinking,
        description: "Standard model for complex reasoning",
        max_tokens: 32768,
        methods: GENERATE_TEXT,
    },
];

impl From<&CatalogEntry> for ModelDescriptor {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            name: entry.name.to_string(),
            version: entry.version.to_string(),
            model_type: entry.model_type,
            description: entry.description.to_string(),
            max_tokens: entry.max_tokens,
            supported_methods: entry.methods.iter().map(|m| m.to_string()).collect(),
        }
    }
}

/// Compare dotted numeric versions component-wise. Missing or non-numeric
/// components count as zero.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let parse = |v: &str| -> Vec<u64> {
        v.split('.')
            .map(|part| part.trim().parse::<u64>().unwrap_or(0))
            .collect()
    };
    let (a, b) = (parse(a), parse(b));
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Catalog order: newest version first, then by type priority.
pub fn catalog_order(a: &ModelDescriptor, b: &ModelDescriptor) -> Ordering {
    compare_versions(&b.version, &a.version)
        .then_with(|| a.model_type.priority().cmp(&b.model_type.priority()))
}

/// All known models, sorted by `catalog_order`.
pub fn list_models() -> Vec<ModelDescriptor> {
    let mut models: Vec<ModelDescriptor> = CATALOG.iter().map(ModelDescriptor::from).collect();
    models.sort_by(catalog_order);
    models
}

pub fn find_model(id: &str) -> Option<ModelDescriptor> {
    CATALOG
        .iter()
        .find(|entry| entry.id == id)
        .map(ModelDescriptor::from)
}

/// Like `find_model`, but an unknown id is an error.
pub fn require_model(id: &str) -> Result<ModelDescriptor> {
    find_model(id).ok_or_else(|| {
        ConsoleError::ModelList(format!("Model '{id}' is not in the catalog"))
    })
}
