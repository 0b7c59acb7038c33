use entitylens_common::ExtractedEntity;

/// Emitted when two candidates are too similar to treat as distinct but
/// not similar enough to merge outright — similarity in [0.70, SIM_THRESHOLD)
/// or distance in [DIST_THRESHOLD, 2×DIST_THRESHOLD] (spec.md §4.9). Left
/// for out-of-band review rather than silently merged or silently dropped.
#[derive(Debug, Clone)]
pub struct MergeConflict {
    pub candidate_a: ExtractedEntity,
    pub candidate_b: ExtractedEntity,
    pub reason: String,
}
