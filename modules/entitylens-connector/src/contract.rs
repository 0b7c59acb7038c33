use async_trait::async_trait;
use entitylens_common::{EngineError, IngestRequest, QueryFeatures, RawPayload};

/// Identity the orchestrator threads through a connector call. Deliberately
/// minimal — a connector never needs the full `LensContract`, only what
/// lens is active, so this crate stays a leaf dependency (no cycle back
/// through `entitylens-context` → `entitylens-loader` → here).
#[derive(Debug, Clone)]
pub struct ConnectorContext {
    pub lens_id: String,
    pub lens_hash: String,
}

/// The uniform interface the Orchestrator (C4) invokes. Concrete connectors
/// (search APIs, government feeds, crowdsourced geodata, commercial place
/// databases) are external collaborators; this crate only defines the seam.
#[async_trait]
pub trait Connector: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch zero or more raw payloads. `deadline_ms` is the remaining
    /// budget on the clock, derived from `ConnectorSpec::timeout_ms`; a
    /// well-behaved implementation races its own IO against it rather than
    /// relying solely on the orchestrator's outer `tokio::time::timeout`.
    async fn execute(
        &self,
        request: &IngestRequest,
        query_features: &QueryFeatures,
        context: &ConnectorContext,
        deadline_ms: u64,
    ) -> Result<Vec<RawPayload>, EngineError>;
}
