//! In-memory connector for tests and for the reference CLI's demo registry.
//! HashMap-based query→payloads, matching the mock fetcher pattern used
//! throughout the pipeline's own test harness.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use entitylens_common::{EngineError, IngestRequest, QueryFeatures, RawPayload};

use crate::contract::{Connector, ConnectorContext};

/// Returns fixed payloads for registered queries (matched on
/// `query_features.normalized_query`), or an empty vec for anything else.
pub struct MockConnector {
    name: String,
    responses: Mutex<HashMap<String, Vec<RawPayload>>>,
    fail_on: Mutex<Option<String>>,
}

impl MockConnector {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: Mutex::new(HashMap::new()),
            fail_on: Mutex::new(None),
        }
    }

    pub fn on_query(self, query: impl Into<String>, payloads: Vec<RawPayload>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(query.into(), payloads);
        self
    }

    pub fn failing_on(self, query: impl Into<String>) -> Self {
        *self.fail_on.lock().unwrap() = Some(query.into());
        self
    }
}

#[async_trait]
impl Connector for MockConnector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(
        &self,
        _request: &IngestRequest,
        query_features: &QueryFeatures,
        _context: &ConnectorContext,
        _deadline_ms: u64,
    ) -> Result<Vec<RawPayload>, EngineError> {
        if let Some(fail_query) = self.fail_on.lock().unwrap().as_ref() {
            if fail_query == &query_features.normalized_query {
                return Err(EngineError::Connector {
                    connector: self.name.clone(),
                    kind: "simulated_failure".to_string(),
                    message: "mock connector configured to fail on this query".to_string(),
                });
            }
        }
        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&query_features.normalized_query)
            .cloned()
            .unwrap_or_default())
    }
}
