use std::collections::BTreeMap;
use std::sync::Arc;

use crate::contract::Extractor;

/// Extractors are polymorphic over a small capability set, dispatched by
/// the source-name tag declared in `RawPayload::source` — a dispatch
/// table, not runtime type introspection (spec.md §9).
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: BTreeMap<String, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, extractor: Arc<dyn Extractor>) -> &mut Self {
        self.extractors.insert(extractor.source_tag().to_string(), extractor);
        self
    }

    pub fn get(&self, source_tag: &str) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(source_tag).cloned()
    }
}
