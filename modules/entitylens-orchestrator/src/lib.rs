pub mod budget;
pub mod orchestrator;
pub mod run;
pub mod state;

pub use budget::BudgetTracker;
pub use orchestrator::{ConnectorHandlers, Orchestrator};
pub use run::RunSummary;
pub use state::{BudgetSkipped, ExecutionState, PhaseOutcome, RunErrorRecord};

#[cfg(all(test, feature = "test-support"))]
mod tests {
    use std::sync::Arc;

    use entitylens_common::{IngestMode, IngestRequest, RawPayload};
    use entitylens_connector::mock::MockConnector;
    use entitylens_connector::{ConnectorRegistry, ConnectorSpec, Phase};
    use entitylens_context::ExecutionContext;
    use entitylens_extract::registry::ExtractorRegistry;
    use tokio_util::sync::CancellationToken;

    use super::*;

    const LENS: &str = r#"
schema:
  version: "1.0"
facets:
  activity:
    dimension_source: activities
    ui_label: "Activities"
values:
  - key: coffee
    facet: activity
    display_name: "Coffee"
    seo_slug: coffee
    search_keywords: ["coffee"]
mapping_rules:
  - id: r1
    pattern: "(?i)coffee"
    canonical: coffee
    dimension: activities
    confidence: 0.9
connector_rules:
  demo_search:
    priority: 1
    triggers:
      - kind: mode_is
        mode: discover_many
"#;

    struct EchoExtractor;

    #[async_trait::async_trait]
    impl entitylens_extract::Extractor for EchoExtractor {
        fn source_tag(&self) -> &str {
            "demo_search"
        }

        async fn extract(
            &self,
            raw: &RawPayload,
        ) -> Result<entitylens_common::Primitives, entitylens_common::EngineError> {
            let name = raw.body.get("name").and_then(|v| v.as_str()).map(str::to_string);
            Ok(entitylens_common::Primitives {
                entity_name: name,
                ..Default::default()
            })
        }
    }

    fn registry() -> ConnectorRegistry {
        let mut r = ConnectorRegistry::new();
        r.register(ConnectorSpec {
            name: "demo_search".to_string(),
            phase: Phase::Discovery,
            trust_level: 60,
            cost_per_call_usd: 0.01,
            avg_latency_ms: 50,
            timeout_ms: 2000,
            requires: vec![],
            provides: vec![],
        });
        r
    }

    #[tokio::test]
    async fn a_full_run_produces_a_merged_entity() {
        let conn_registry = registry();
        let lens = entitylens_loader::load_lens("demo", LENS, &conn_registry).unwrap();
        let context = ExecutionContext::new("demo".to_string(), lens);

        let request = IngestRequest::new(IngestMode::DiscoverMany, "coffee");
        let features = entitylens_planner::derive_features(&request, context.lens_contract.as_ref());
        let plan = entitylens_planner::plan(&request, &features, context.lens_contract.as_ref(), &conn_registry).unwrap();

        let payload = RawPayload::new("demo_search", serde_json::json!({"name": "Riverside Coffee"}));
        let mock = MockConnector::new("demo_search").on_query("coffee", vec![payload]);

        let mut connectors: ConnectorHandlers = ConnectorHandlers::new();
        connectors.insert("demo_search".to_string(), Arc::new(mock));

        let mut extractors = ExtractorRegistry::new();
        extractors.register(Arc::new(EchoExtractor));

        let orchestrator = Orchestrator::new(conn_registry, connectors, extractors);
        let summary = orchestrator
            .run(request, features, &context, &plan, CancellationToken::new())
            .await;

        assert_eq!(summary.entities.len(), 1);
        assert_eq!(summary.entities[0].primitives.entity_name.as_deref(), Some("Riverside Coffee"));
        assert!(!summary.cancelled);
    }

    fn budget_registry() -> ConnectorRegistry {
        let mut r = ConnectorRegistry::new();
        r.register(ConnectorSpec {
            name: "demo_search".to_string(),
            phase: Phase::Discovery,
            trust_level: 60,
            cost_per_call_usd: 0.01,
            avg_latency_ms: 10,
            timeout_ms: 2000,
            requires: vec![],
            provides: vec![],
        });
        r.register(ConnectorSpec {
            name: "struct_a".to_string(),
            phase: Phase::Structured,
            trust_level: 50,
            cost_per_call_usd: 0.02,
            avg_latency_ms: 10,
            timeout_ms: 2000,
            requires: vec![],
            provides: vec![],
        });
        r.register(ConnectorSpec {
            name: "struct_b".to_string(),
            phase: Phase::Structured,
            trust_level: 40,
            cost_per_call_usd: 0.05,
            avg_latency_ms: 10,
            timeout_ms: 2000,
            requires: vec![],
            provides: vec![],
        });
        r
    }

    const BUDGET_LENS: &str = r#"
schema:
  version: "1.0"
facets:
  activity:
    dimension_source: activities
    ui_label: "Activities"
values:
  - key: coffee
    facet: activity
    display_name: "Coffee"
    seo_slug: coffee
    search_keywords: ["coffee"]
mapping_rules:
  - id: r1
    pattern: "(?i)coffee"
    canonical: coffee
    dimension: activities
    confidence: 0.9
connector_rules:
  demo_search:
    priority: 1
    triggers:
      - kind: mode_is
        mode: discover_many
  struct_a:
    priority: 1
    triggers:
      - kind: mode_is
        mode: discover_many
  struct_b:
    priority: 2
    triggers:
      - kind: mode_is
        mode: discover_many
"#;

    /// Replays spec.md §8 Scenario D: three connectors costing
    /// $0.01/$0.02/$0.05 against a $0.03 run budget. After Discovery spends
    /// $0.01, Structured's combined estimated cost ($0.07) would push spend
    /// to $0.08, so the whole phase must be skipped and recorded, not run
    /// connector-by-connector.
    #[tokio::test]
    async fn a_phase_is_skipped_entirely_when_its_estimated_cost_exceeds_remaining_budget() {
        let conn_registry = budget_registry();
        let lens = entitylens_loader::load_lens("demo", BUDGET_LENS, &conn_registry).unwrap();
        let context = ExecutionContext::new("demo".to_string(), lens);

        // Plan without a budget constraint, so every registered connector
        // that matches a trigger stays in the plan; enforcing the budget at
        // runtime is the orchestrator's job, not the planner's.
        let planning_request = IngestRequest::new(IngestMode::DiscoverMany, "coffee");
        let features = entitylens_planner::derive_features(&planning_request, context.lens_contract.as_ref());
        let plan = entitylens_planner::plan(&planning_request, &features, context.lens_contract.as_ref(), &conn_registry).unwrap();

        let mut request = IngestRequest::new(IngestMode::DiscoverMany, "coffee");
        request.budget_usd = Some(0.03);

        let payload = RawPayload::new("demo_search", serde_json::json!({"name": "Riverside Coffee"}));
        let mock_discover = MockConnector::new("demo_search").on_query("coffee", vec![payload]);
        let mock_struct_a = MockConnector::new("struct_a").on_query("coffee", vec![]);
        let mock_struct_b = MockConnector::new("struct_b").on_query("coffee", vec![]);

        let mut connectors: ConnectorHandlers = ConnectorHandlers::new();
        connectors.insert("demo_search".to_string(), Arc::new(mock_discover));
        connectors.insert("struct_a".to_string(), Arc::new(mock_struct_a));
        connectors.insert("struct_b".to_string(), Arc::new(mock_struct_b));

        let mut extractors = ExtractorRegistry::new();
        extractors.register(Arc::new(EchoExtractor));

        let orchestrator = Orchestrator::new(conn_registry, connectors, extractors);
        let summary = orchestrator
            .run(request, features, &context, &plan, CancellationToken::new())
            .await;

        let structured = summary
            .phase_results
            .get(&Phase::Structured)
            .expect("structured phase result recorded even when skipped");
        assert!(structured.budget_skipped.is_some());
        assert!(structured.connectors_run.is_empty());
        assert_eq!(summary.budget_spent_usd, 0.01);
    }

    #[tokio::test]
    async fn an_already_cancelled_token_stops_the_run_before_any_phase() {
        let conn_registry = registry();
        let lens = entitylens_loader::load_lens("demo", LENS, &conn_registry).unwrap();
        let context = ExecutionContext::new("demo".to_string(), lens);

        let request = IngestRequest::new(IngestMode::DiscoverMany, "coffee");
        let features = entitylens_planner::derive_features(&request, context.lens_contract.as_ref());
        let plan = entitylens_planner::plan(&request, &features, context.lens_contract.as_ref(), &conn_registry).unwrap();

        let connectors: ConnectorHandlers = ConnectorHandlers::new();
        let extractors = ExtractorRegistry::new();
        let orchestrator = Orchestrator::new(conn_registry, connectors, extractors);

        let token = CancellationToken::new();
        token.cancel();
        let summary = orchestrator.run(request, features, &context, &plan, token).await;

        assert!(summary.entities.is_empty());
        assert!(summary.cancelled);
    }
}
