use thiserror::Error;

/// Cross-cutting error kinds from the error taxonomy. These are the kinds
/// that need to be pattern-matched at component boundaries (for exit-code
/// and disposition decisions); anything else rides in through `Anyhow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LensConfig,
    LensResolution,
    Planning,
    Connector,
    Extraction,
    PurityViolation,
    MergeConflict,
    Persistence,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::LensConfig => "lens_config",
            ErrorKind::LensResolution => "lens_resolution",
            ErrorKind::Planning => "planning",
            ErrorKind::Connector => "connector",
            ErrorKind::Extraction => "extraction",
            ErrorKind::PurityViolation => "purity_violation",
            ErrorKind::MergeConflict => "merge_conflict",
            ErrorKind::Persistence => "persistence",
        };
        write!(f, "{s}")
    }
}

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("lens config error at {path}: {reason}")]
    LensConfig {
        reason: String,
        path: String,
        snippet: Option<String>,
    },

    #[error("lens resolution error: {0}")]
    LensResolution(String),

    #[error("planning error: {0}")]
    Planning(String),

    #[error("connector error ({connector}, {kind}): {message}")]
    Connector {
        connector: String,
        kind: String,
        message: String,
    },

    #[error("extraction error: {0}")]
    Extraction(String),

    #[error("purity violation in {source}: unexpected key(s) {keys:?}")]
    PurityViolation { source: String, keys: Vec<String> },

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::LensConfig { .. } => ErrorKind::LensConfig,
            EngineError::LensResolution(_) => ErrorKind::LensResolution,
            EngineError::Planning(_) => ErrorKind::Planning,
            EngineError::Connector { .. } => ErrorKind::Connector,
            EngineError::Extraction(_) => ErrorKind::Extraction,
            EngineError::PurityViolation { .. } => ErrorKind::PurityViolation,
            EngineError::Persistence(_) => ErrorKind::Persistence,
            EngineError::Other(_) => ErrorKind::Extraction,
        }
    }
}
