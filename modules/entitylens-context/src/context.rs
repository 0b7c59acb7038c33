use std::sync::Arc;

use entitylens_loader::LensContract;

/// Immutable, run-scoped carrier of lens identity and contract. Safe to
/// log, persist, and replay — it carries only plain data, no loaders or
/// registries embedded (spec.md §4.2).
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    pub lens_id: String,
    pub lens_contract: Arc<LensContract>,
    pub lens_hash: String,
}

impl ExecutionContext {
    pub fn new(lens_id: String, lens_contract: LensContract) -> Self {
        let lens_hash = lens_contract.content_hash.clone();
        Self {
            lens_id,
            lens_contract: Arc::new(lens_contract),
            lens_hash,
        }
    }

    /// The minimal identity a `Connector` implementation needs — avoids
    /// handing connectors the full contract (they have no business reading
    /// lens rules; only the Mapping Engine does).
    pub fn connector_context(&self) -> entitylens_connector::ConnectorContext {
        entitylens_connector::ConnectorContext {
            lens_id: self.lens_id.clone(),
            lens_hash: self.lens_hash.clone(),
        }
    }
}
