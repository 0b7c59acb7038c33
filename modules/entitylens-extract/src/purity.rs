use entitylens_common::{is_primitive_key, EngineError, Primitives};

/// Enforce spec.md §8 invariant 1: the serialized keys of a `Primitives`
/// value must all be members of the primitive set. `Primitives` can't
/// structurally hold a canonical or module field, so this mostly guards
/// against an extractor smuggling a canonical-looking value into
/// `raw_observations` under a primitive-shaped key — which would still be
/// harmless at this layer but is rejected anyway so the contract stays
/// legible to callers.
pub fn check(primitives: &Primitives) -> Result<(), EngineError> {
    let value = serde_json::to_value(primitives)
        .map_err(|e| EngineError::Extraction(format!("primitives not serializable: {e}")))?;
    check_value(&value)
}

/// Same check against a raw JSON object, independent of the `Primitives`
/// type. `Primitives` can't structurally carry a canonical or module key,
/// so this is what actually exercises the rejection path: it's run
/// against the pre-typed JSON an extractor hands back before it gets
/// deserialized into `Primitives`.
pub fn check_value(value: &serde_json::Value) -> Result<(), EngineError> {
    let obj = value
        .as_object()
        .ok_or_else(|| EngineError::Extraction("extractor output was not a JSON object".to_string()))?;

    let offending: Vec<String> = obj
        .keys()
        .filter(|k| !is_primitive_key(k))
        .cloned()
        .collect();

    if !offending.is_empty() {
        return Err(EngineError::PurityViolation {
            source: "extractor".to_string(),
            keys: offending,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_primitives_pass() {
        let p = Primitives {
            entity_name: Some("Acme".to_string()),
            ..Default::default()
        };
        assert!(check(&p).is_ok());
    }

    #[test]
    fn raw_observations_and_external_ids_are_allowed() {
        let mut p = Primitives::default();
        p.raw_observations
            .insert("osm_tags".to_string(), serde_json::json!({"amenity": "cafe"}));
        p.external_ids.insert("osm".to_string(), "node/123".to_string());
        assert!(check(&p).is_ok());
    }

    #[test]
    fn a_canonical_looking_key_at_the_top_level_is_rejected() {
        let value = serde_json::json!({
            "entity_name": "Riverside Cafe",
            "canonical_activities": ["k1"],
        });
        let err = check_value(&value).unwrap_err();
        match err {
            EngineError::PurityViolation { keys, .. } => {
                assert_eq!(keys, vec!["canonical_activities".to_string()]);
            }
            other => panic!("expected PurityViolation, got {other:?}"),
        }
    }
}
