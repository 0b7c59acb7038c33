use entitylens_common::ExtractedEntity;
use serde::{Deserialize, Serialize};

/// Recorded when a candidate fails to persist. Inspectable (not silently
/// dropped) so retry is a deliberate, external, idempotent-by-slug
/// operation (spec.md §4.10/§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedExtraction {
    pub entity_snapshot: ExtractedEntity,
    pub error: String,
    pub retry_count: u32,
}

impl FailedExtraction {
    pub fn first_failure(entity_snapshot: ExtractedEntity, error: impl Into<String>) -> Self {
        Self {
            entity_snapshot,
            error: error.into(),
            retry_count: 0,
        }
    }
}
