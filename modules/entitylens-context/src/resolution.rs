use entitylens_common::EngineError;
use tracing::info;

/// Where the resolved lens id came from — kept for logging/replay so a run
/// can be reproduced by pinning the same source explicitly later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LensIdSource {
    CliArgument,
    EnvironmentVariable,
    ApplicationConfig,
    DevFallback,
}

/// Resolve the lens id to use for this run. Order: CLI argument → `LENS_ID`
/// environment variable → application config → explicit dev fallback (only
/// if `allow_dev_fallback` is set — forbidden in validation runs).
pub fn resolve_lens_id(
    cli_arg: Option<&str>,
    app_config_lens_id: Option<&str>,
    dev_fallback: Option<&str>,
    allow_dev_fallback: bool,
) -> Result<(String, LensIdSource), EngineError> {
    if let Some(id) = cli_arg {
        info!(lens_id = id, "lens resolved from CLI argument");
        return Ok((id.to_string(), LensIdSource::CliArgument));
    }
    if let Ok(id) = std::env::var("LENS_ID") {
        if !id.is_empty() {
            info!(lens_id = %id, "lens resolved from LENS_ID env var");
            return Ok((id, LensIdSource::EnvironmentVariable));
        }
    }
    if let Some(id) = app_config_lens_id {
        info!(lens_id = id, "lens resolved from application config");
        return Ok((id.to_string(), LensIdSource::ApplicationConfig));
    }
    if allow_dev_fallback {
        if let Some(id) = dev_fallback {
            info!(lens_id = id, "lens resolved from dev fallback (--allow-default-lens)");
            return Ok((id.to_string(), LensIdSource::DevFallback));
        }
    }
    Err(EngineError::LensResolution(
        "no lens id available: checked CLI argument, LENS_ID env var, application config, \
         and dev fallback (dev fallback requires --allow-default-lens)"
            .to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_argument_wins_over_everything() {
        let (id, src) = resolve_lens_id(Some("from-cli"), Some("from-config"), Some("dev"), true)
            .unwrap();
        assert_eq!(id, "from-cli");
        assert_eq!(src, LensIdSource::CliArgument);
    }

    #[test]
    fn dev_fallback_requires_explicit_flag() {
        let err = resolve_lens_id(None, None, Some("dev"), false);
        assert!(err.is_err());
    }

    #[test]
    fn missing_lens_with_no_fallback_fails() {
        let err = resolve_lens_id(None, None, None, true);
        assert!(err.is_err());
    }
}
