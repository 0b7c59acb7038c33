use std::collections::BTreeMap;

use entitylens_connector::Phase;
use entitylens_merge::MergeConflict;

/// A connector or extraction failure recorded without aborting the run
/// (spec.md §7: "errors[] for connector/extraction failures").
#[derive(Debug, Clone)]
pub struct RunErrorRecord {
    pub phase: Phase,
    pub connector: String,
    pub message: String,
}

/// Recorded when a phase is skipped outright because even its estimated
/// cost (the sum of its connectors' `cost_per_call_usd`) would push total
/// spend past the run budget (spec.md §4.4 pre-phase check).
#[derive(Debug, Clone)]
pub struct BudgetSkipped {
    pub estimated_cost_usd: f64,
    pub budget_spent_usd: f64,
}

#[derive(Debug, Clone, Default)]
pub struct PhaseOutcome {
    pub connectors_run: Vec<String>,
    pub payloads_fetched: usize,
    pub candidates_extracted: usize,
    pub budget_skipped: Option<BudgetSkipped>,
}

/// Mutable, run-confined state, owned exclusively by the orchestrator's
/// main loop. Worker tasks return values to it; they never mutate it
/// directly (spec.md §5 shared-resource policy).
#[derive(Debug, Default)]
pub struct ExecutionState {
    pub candidates: Vec<entitylens_common::ExtractedEntity>,
    pub conflicts: Vec<MergeConflict>,
    pub phase_results: BTreeMap<Phase, PhaseOutcome>,
    pub errors: Vec<RunErrorRecord>,
}
