use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque connector-native data plus the metadata the orchestrator and
/// extractor registry need to route and hash it. The `body` is whatever
/// shape the connector produced (JSON is the common case, kept opaque here
/// since the core never interprets it directly — only the matching
/// extractor does).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPayload {
    pub source: String,
    pub source_url: Option<String>,
    pub fetched_at: DateTime<Utc>,
    pub hash: String,
    pub body: serde_json::Value,
}

impl RawPayload {
    pub fn new(source: impl Into<String>, body: serde_json::Value) -> Self {
        let source = source.into();
        let hash = crate::content_hash_hex(&body.to_string());
        Self {
            source,
            source_url: None,
            fetched_at: Utc::now(),
            hash,
            body,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }
}
