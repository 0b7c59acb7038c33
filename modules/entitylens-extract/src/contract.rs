use async_trait::async_trait;
use entitylens_common::{EngineError, Primitives, RawPayload};

/// Per-source transformation of a raw payload into schema primitives. The
/// purity rule (spec.md §4.6) is a hard invariant enforced by
/// `purity::check`, not by the type system alone (the output type
/// `Primitives` already can't hold canonical/module fields, but connectors
/// also pass through `raw_observations`/`external_ids`, which *could* be
/// abused to smuggle canonical-looking keys — the contract test in
/// `purity` guards against exactly that).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Tag this extractor is registered under (matches `RawPayload::source`).
    fn source_tag(&self) -> &str;

    async fn extract(&self, raw: &RawPayload) -> Result<Primitives, EngineError>;

    /// Normalize and validate: phone to E.164, postcode format, coordinate
    /// range. Invalid values are nulled, never inferred/guessed.
    fn validate(&self, primitives: Primitives) -> Primitives {
        crate::normalize::validate(primitives)
    }

    /// Rich free text pulled from the payload for downstream summarization.
    /// Default: nothing. Extractors for content-bearing sources override.
    fn extract_rich_text(&self, _raw: &RawPayload) -> Vec<String> {
        Vec::new()
    }
}
