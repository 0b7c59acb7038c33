pub mod contract;
pub mod normalize;
pub mod purity;
pub mod registry;

pub use contract::Extractor;
pub use registry::ExtractorRegistry;

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use entitylens_common::{EngineError, Primitives, RawPayload};
    use std::sync::Arc;

    struct DemoExtractor;

    #[async_trait]
    impl Extractor for DemoExtractor {
        fn source_tag(&self) -> &str {
            "demo"
        }

        async fn extract(&self, raw: &RawPayload) -> Result<Primitives, EngineError> {
            let name = raw.body.get("name").and_then(|v| v.as_str()).map(str::to_string);
            Ok(self.validate(Primitives {
                entity_name: name,
                ..Default::default()
            }))
        }
    }

    #[tokio::test]
    async fn registered_extractor_round_trips_through_the_registry() {
        let mut registry = ExtractorRegistry::new();
        registry.register(Arc::new(DemoExtractor));

        let extractor = registry.get("demo").expect("demo extractor registered");
        let raw = RawPayload::new("demo", serde_json::json!({"name": "Riverside Cafe"}));
        let primitives = extractor.extract(&raw).await.unwrap();

        assert_eq!(primitives.entity_name.as_deref(), Some("Riverside Cafe"));
        assert!(purity::check(&primitives).is_ok());
    }

    #[test]
    fn unregistered_source_tag_returns_none() {
        let registry = ExtractorRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }
}
