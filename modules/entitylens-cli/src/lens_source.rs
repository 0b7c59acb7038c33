use entitylens_common::EngineError;

/// Sentinel lens id for `--allow-default-lens`: a small, structural-only
/// lens (no reference-domain vocabulary) that exercises every stage of the
/// pipeline without external configuration.
pub const DEV_FALLBACK_LENS_ID: &str = "default";

const EMBEDDED_DEMO_LENS: &str = include_str!("../lenses/default.yaml");

/// Fetch the YAML document for a resolved lens id. The embedded fallback
/// lens is served in-process; everything else is read from `LENS_DIR`
/// (default `./lenses`) as `<LENS_DIR>/<lens_id>.yaml`.
pub fn load_lens_document(lens_id: &str) -> Result<String, EngineError> {
    if lens_id == DEV_FALLBACK_LENS_ID {
        return Ok(EMBEDDED_DEMO_LENS.to_string());
    }

    let dir = std::env::var("LENS_DIR").unwrap_or_else(|_| "./lenses".to_string());
    let path = std::path::Path::new(&dir).join(format!("{lens_id}.yaml"));
    std::fs::read_to_string(&path).map_err(|e| {
        EngineError::LensResolution(format!(
            "failed to read lens document for '{lens_id}' at {}: {e}",
            path.display()
        ))
    })
}
