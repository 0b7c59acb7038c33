pub mod contract;
pub mod gates;
pub mod loader;
pub mod raw;

pub use contract::{
    Applicability, ConnectorRule, ConnectorTrigger, ConnectorTriggerSpec, ExtractorKind, Facet,
    FieldRule, LensContract, MappingRule, ModuleDef, ModuleTrigger, TriggerCondition, ValueDef,
};
pub use loader::load_lens;

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_connector::{ConnectorRegistry, ConnectorSpec, Phase};

    fn registry() -> ConnectorRegistry {
        let mut r = ConnectorRegistry::new();
        r.register(ConnectorSpec {
            name: "demo_search".to_string(),
            phase: Phase::Discovery,
            trust_level: 60,
            cost_per_call_usd: 0.01,
            avg_latency_ms: 200,
            timeout_ms: 2000,
            requires: vec![],
            provides: vec![],
        });
        r
    }

    const MINIMAL_LENS: &str = r#"
schema:
  version: "1.0"
facets:
  activity:
    dimension_source: activities
    ui_label: "Activities"
values:
  - key: k1
    facet: activity
    display_name: "K1"
    seo_slug: k1
mapping_rules:
  - id: r1
    pattern: "\\bk1\\b"
    canonical: k1
    dimension: activities
    confidence: 0.9
connector_rules:
  demo_search:
    priority: 1
    triggers:
      - kind: mode_is
        mode: discover_many
"#;

    #[test]
    fn loads_a_minimal_valid_lens() {
        let contract = load_lens("test-lens", MINIMAL_LENS, &registry()).expect("should load");
        assert_eq!(contract.values.len(), 1);
        assert_eq!(contract.mapping_rules.len(), 1);
        assert!(!contract.content_hash.is_empty());
    }

    #[test]
    fn rejects_unknown_dimension_source() {
        let bad = MINIMAL_LENS.replace("activities", "not_a_real_dimension");
        let err = load_lens("test-lens", &bad, &registry()).unwrap_err();
        assert_eq!(err.kind(), entitylens_common::ErrorKind::LensConfig);
    }

    #[test]
    fn rejects_dangling_canonical_reference() {
        let bad = MINIMAL_LENS.replace("canonical: k1", "canonical: k_missing");
        let err = load_lens("test-lens", &bad, &registry());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unregistered_connector() {
        let bad = MINIMAL_LENS.replace("demo_search", "ghost_connector");
        let err = load_lens("test-lens", &bad, &registry());
        assert!(err.is_err());
    }

    #[test]
    fn rejects_uncompilable_regex() {
        let bad = MINIMAL_LENS.replace(r"\\bk1\\b", "(unclosed");
        let err = load_lens("test-lens", &bad, &registry());
        assert!(err.is_err());
    }

    #[test]
    fn content_hash_is_reproducible_for_identical_source() {
        let c1 = load_lens("test-lens", MINIMAL_LENS, &registry()).unwrap();
        let c2 = load_lens("test-lens", MINIMAL_LENS, &registry()).unwrap();
        assert_eq!(c1.content_hash, c2.content_hash);
    }

    #[test]
    fn content_hash_differs_for_meaningfully_different_lenses() {
        let c1 = load_lens("test-lens", MINIMAL_LENS, &registry()).unwrap();
        let other = MINIMAL_LENS.replace("0.9", "0.5");
        let c2 = load_lens("test-lens", &other, &registry()).unwrap();
        assert_ne!(c1.content_hash, c2.content_hash);
    }
}
