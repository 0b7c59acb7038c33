//! Reference wiring used when no concrete connector is configured: an
//! in-memory connector and a matching extractor, standing in for the
//! external search APIs / government feeds / commercial databases the
//! core integrates with in production (those adapters are out of scope
//! here; see Non-goals).

use std::sync::Arc;

use async_trait::async_trait;
use entitylens_common::{EngineError, Primitives, RawPayload};
use entitylens_connector::mock::MockConnector;
use entitylens_connector::{ConnectorRegistry, ConnectorSpec, Phase};
use entitylens_extract::{Extractor, ExtractorRegistry};

pub const DEMO_CONNECTOR_NAME: &str = "demo_source";

/// Pulls a handful of synthetic records that mention the query tokens, so a
/// `run` against the embedded demo lens produces non-trivial output without
/// any network access.
fn sample_payloads(query: &str) -> Vec<RawPayload> {
    vec![
        RawPayload::new(
            DEMO_CONNECTOR_NAME,
            serde_json::json!({
                "name": format!("{query} Group Alpha Record"),
                "description": "note: sample structural record one",
                "city": "Example City",
            }),
        ),
        RawPayload::new(
            DEMO_CONNECTOR_NAME,
            serde_json::json!({
                "name": format!("{query} Group Beta Record"),
                "description": "a second unrelated record",
                "city": "Example City",
            }),
        ),
    ]
}

pub fn connector_registry() -> ConnectorRegistry {
    let mut registry = ConnectorRegistry::new();
    registry.register(ConnectorSpec {
        name: DEMO_CONNECTOR_NAME.to_string(),
        phase: Phase::Structured,
        trust_level: 50,
        cost_per_call_usd: 0.0,
        avg_latency_ms: 10,
        timeout_ms: 5_000,
        requires: vec![],
        provides: vec![],
    });
    registry
}

pub fn connector_handlers(query: &str) -> entitylens_orchestrator::ConnectorHandlers {
    let mock = MockConnector::new(DEMO_CONNECTOR_NAME).on_query(query.to_lowercase(), sample_payloads(query));
    let mut handlers = entitylens_orchestrator::ConnectorHandlers::new();
    handlers.insert(DEMO_CONNECTOR_NAME.to_string(), Arc::new(mock) as Arc<dyn entitylens_connector::Connector>);
    handlers
}

struct DemoExtractor;

#[async_trait]
impl Extractor for DemoExtractor {
    fn source_tag(&self) -> &str {
        DEMO_CONNECTOR_NAME
    }

    async fn extract(&self, raw: &RawPayload) -> Result<Primitives, EngineError> {
        let name = raw.body.get("name").and_then(|v| v.as_str()).map(str::to_string);
        let description = raw.body.get("description").and_then(|v| v.as_str()).map(str::to_string);
        let city = raw.body.get("city").and_then(|v| v.as_str()).map(str::to_string);
        Ok(Primitives {
            entity_name: name,
            description,
            city,
            ..Default::default()
        })
    }
}

pub fn extractor_registry() -> ExtractorRegistry {
    let mut registry = ExtractorRegistry::new();
    registry.register(Arc::new(DemoExtractor));
    registry
}
