use std::collections::BTreeMap;

use entitylens_common::ExtractedEntity;
use entitylens_connector::Phase;
use entitylens_merge::MergeConflict;

use crate::state::{PhaseOutcome, RunErrorRecord};

/// The result of one orchestrated run, handed back to the CLI/persistence
/// layer. `entities` have already passed cross-source dedup/merge.
#[derive(Debug)]
pub struct RunSummary {
    pub entities: Vec<ExtractedEntity>,
    pub conflicts: Vec<MergeConflict>,
    pub errors: Vec<RunErrorRecord>,
    pub phase_results: BTreeMap<Phase, PhaseOutcome>,
    pub budget_spent_usd: f64,
    pub early_stopped: bool,
    pub cancelled: bool,
}

impl RunSummary {
    /// Exit-code-relevant: did the run produce at least one accepted entity?
    pub fn had_any_success(&self) -> bool {
        !self.entities.is_empty()
    }
}
