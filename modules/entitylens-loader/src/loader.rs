use entitylens_common::{canonical_json_hash, EngineError};
use entitylens_connector::ConnectorRegistry;
use tracing::info;

use crate::contract::LensContract;
use crate::gates::build_contract;
use crate::raw::RawLens;

/// Parse and validate a lens document, running all six fail-fast gates.
/// No partial contract is ever returned — any gate failure short-circuits
/// with `EngineError::LensConfig`.
pub fn load_lens(
    lens_id: &str,
    source: &str,
    registry: &ConnectorRegistry,
) -> Result<LensContract, EngineError> {
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(source).map_err(|e| EngineError::LensConfig {
            reason: format!("YAML parse error: {e}"),
            path: lens_id.to_string(),
            snippet: snippet_near(source),
        })?;
    let raw: RawLens =
        serde_yaml::from_value(yaml_value.clone()).map_err(|e| EngineError::LensConfig {
            reason: format!("schema-shape error: {e}"),
            path: lens_id.to_string(),
            snippet: snippet_near(source),
        })?;

    let json = serde_json::to_value(&yaml_value).unwrap_or(serde_json::Value::Null);
    let content_hash = canonical_json_hash(&json);

    let contract = build_contract(raw, lens_id.to_string(), content_hash, registry)?;
    info!(
        lens_id,
        content_hash = %contract.content_hash,
        facets = contract.facets.len(),
        values = contract.values.len(),
        mapping_rules = contract.mapping_rules.len(),
        "lens loaded and validated"
    );
    Ok(contract)
}

fn snippet_near(source: &str) -> Option<String> {
    source.lines().take(3).collect::<Vec<_>>().join("\n").into()
}
