use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    ResolveOne,
    DiscoverMany,
}

/// Immutable input to a single run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub mode: IngestMode,
    pub query: String,
    pub target_entity_count: Option<u32>,
    pub min_confidence: Option<f64>,
    pub budget_usd: Option<f64>,
    pub persist: bool,
    pub lens_id: Option<String>,
}

impl IngestRequest {
    pub fn new(mode: IngestMode, query: impl Into<String>) -> Self {
        Self {
            mode,
            query: query.into(),
            target_entity_count: None,
            min_confidence: None,
            budget_usd: None,
            persist: false,
            lens_id: None,
        }
    }
}

/// Derived query features (C3 Planner output), consumed by connector
/// selection and passed to connectors themselves.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryFeatures {
    pub normalized_query: String,
    pub detected_keywords: Vec<String>,
    pub geographic_hints: Vec<String>,
    pub looks_like_category_search: bool,
    pub is_sports_like: bool,
}
