use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use entitylens_common::{EngineError, ExtractedEntity, IngestMode, IngestRequest, Primitives, QueryFeatures, RawPayload};
use entitylens_connector::{Connector, ConnectorRegistry, Phase};
use entitylens_context::ExecutionContext;
use entitylens_extract::ExtractorRegistry;
use entitylens_planner::ExecutionPlan;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::budget::BudgetTracker;
use crate::run::RunSummary;
use crate::state::{BudgetSkipped, ExecutionState, PhaseOutcome, RunErrorRecord};

/// Bounded grace period given to in-flight tasks after cancellation before
/// their partial output is discarded (spec.md §5).
const CANCELLATION_GRACE: Duration = Duration::from_secs(2);

/// Runtime handles for registered connectors, keyed by name. Separate from
/// `ConnectorRegistry` (which only holds `ConnectorSpec` metadata) because
/// the registry crate is a leaf with no business owning live adapter
/// instances.
pub type ConnectorHandlers = BTreeMap<String, Arc<dyn Connector>>;

/// Drives one run end to end: phase barrier over `Phase::ORDER`, a bounded
/// worker pool within each phase, per-connector timeouts, run-level
/// cancellation with a grace period, candidate extraction and in-run
/// dedup/merge, and early stopping (spec.md §4.4/§5).
pub struct Orchestrator {
    pub connector_specs: ConnectorRegistry,
    pub connectors: ConnectorHandlers,
    pub extractors: ExtractorRegistry,
    pub max_concurrency: usize,
}

impl Orchestrator {
    pub fn new(connector_specs: ConnectorRegistry, connectors: ConnectorHandlers, extractors: ExtractorRegistry) -> Self {
        Self {
            connector_specs,
            connectors,
            extractors,
            max_concurrency: 8,
        }
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.max_concurrency = n.max(1);
        self
    }

    pub async fn run(
        &self,
        request: IngestRequest,
        features: QueryFeatures,
        context: &ExecutionContext,
        plan: &ExecutionPlan,
        cancellation: CancellationToken,
    ) -> RunSummary {
        let budget = BudgetTracker::new(request.budget_usd);
        let mut state = ExecutionState::default();
        let mut early_stopped = false;

        for phase in Phase::ORDER {
            if cancellation.is_cancelled() {
                info!(?phase, "run cancelled before phase started");
                break;
            }
            if early_stopped {
                break;
            }

            let connector_names = plan.phase_map.get(&phase).cloned().unwrap_or_default();
            if connector_names.is_empty() {
                continue;
            }

            // Pre-phase check (spec.md §4.4): estimate the phase's cost as
            // the sum of its connectors' per-call cost, and skip the whole
            // phase if that would push spend past the budget. Individual
            // connectors are never gated one at a time.
            let estimated_phase_cost: f64 = connector_names
                .iter()
                .filter_map(|name| self.connector_specs.get(name))
                .map(|spec| spec.cost_per_call_usd)
                .sum();

            if !budget.has_budget(estimated_phase_cost) {
                warn!(?phase, estimated_phase_cost, spent_usd = budget.total_spent_usd(), "skipping phase, insufficient run budget");
                state.phase_results.insert(
                    phase,
                    PhaseOutcome {
                        budget_skipped: Some(BudgetSkipped {
                            estimated_cost_usd: estimated_phase_cost,
                            budget_spent_usd: budget.total_spent_usd(),
                        }),
                        ..Default::default()
                    },
                );
                continue;
            }

            info!(?phase, connectors = ?connector_names, "entering phase");

            let per_connector = self
                .run_phase(
                    phase,
                    &connector_names,
                    &request,
                    &features,
                    context,
                    &budget,
                    cancellation.clone(),
                )
                .await;

            // Drain in connector-alphabetical order regardless of completion
            // order, so dedup is deterministic (spec.md §5).
            let mut outcome = PhaseOutcome {
                connectors_run: connector_names.clone(),
                ..Default::default()
            };

            let mut new_candidates = Vec::new();
            for name in &connector_names {
                let Some(result) = per_connector.get(name) else { continue };
                match result {
                    Ok(payloads) => {
                        outcome.payloads_fetched += payloads.len();
                        for raw in payloads {
                            match self.extract_and_map(raw, context).await {
                                Ok(entity) => new_candidates.push(entity),
                                Err(e) => state.errors.push(RunErrorRecord {
                                    phase,
                                    connector: name.clone(),
                                    message: e.to_string(),
                                }),
                            }
                        }
                    }
                    Err(message) => {
                        state.errors.push(RunErrorRecord {
                            phase,
                            connector: name.clone(),
                            message: message.clone(),
                        });
                    }
                }
            }
            outcome.candidates_extracted = new_candidates.len();
            state.phase_results.insert(phase, outcome);

            if !new_candidates.is_empty() {
                self.merge_into_state(&mut state, new_candidates);
            }

            // Post-phase check (spec.md §4.4): stop the run once spend has
            // reached or passed the budget, after letting the phase that
            // crossed it finish.
            if budget.is_exhausted() {
                early_stopped = true;
                info!(?phase, spent_usd = budget.total_spent_usd(), "run budget exhausted, stopping run");
            }

            if should_stop_early(&request, &state) {
                early_stopped = true;
                debug!(phase = ?phase, "early-stopping condition met");
            }
        }

        RunSummary {
            entities: state.candidates,
            conflicts: state.conflicts,
            errors: state.errors,
            phase_results: state.phase_results,
            budget_spent_usd: budget.total_spent_usd(),
            early_stopped,
            cancelled: cancellation.is_cancelled(),
        }
    }

    /// Launch one task per connector in this phase, bounded by a semaphore,
    /// and collect results keyed by connector name.
    async fn run_phase(
        &self,
        phase: Phase,
        connector_names: &[String],
        request: &IngestRequest,
        features: &QueryFeatures,
        context: &ExecutionContext,
        budget: &BudgetTracker,
        cancellation: CancellationToken,
    ) -> BTreeMap<String, Result<Vec<RawPayload>, String>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let conn_context = context.connector_context();
        let mut handles = Vec::with_capacity(connector_names.len());

        for name in connector_names {
            if cancellation.is_cancelled() {
                break;
            }
            let Some(spec) = self.connector_specs.get(name) else {
                continue;
            };
            let Some(connector) = self.connectors.get(name).cloned() else {
                continue;
            };

            let permit = semaphore.clone();
            let request = request.clone();
            let features = features.clone();
            let conn_context = conn_context.clone();
            let timeout_ms = spec.timeout_ms;
            let cost_usd = spec.cost_per_call_usd;
            let name = name.clone();
            let cancellation = cancellation.clone();

            let join = tokio::spawn(async move {
                let _permit = permit.acquire_owned().await.expect("semaphore not closed");
                match tokio::time::timeout(
                    Duration::from_millis(timeout_ms),
                    connector.execute(&request, &features, &conn_context, timeout_ms),
                )
                .await
                {
                    Ok(result) => result,
                    Err(_) => Err(EngineError::Connector {
                        connector: connector.name().to_string(),
                        kind: "timeout".to_string(),
                        message: format!("exceeded {timeout_ms}ms deadline"),
                    }),
                }
            });

            handles.push((name, cost_usd, join));
        }

        let mut results = BTreeMap::new();
        for (name, cost_usd, mut join) in handles {
            let outcome = tokio::select! {
                res = &mut join => res,
                _ = cancellation.cancelled() => {
                    match tokio::time::timeout(CANCELLATION_GRACE, &mut join).await {
                        Ok(res) => res,
                        Err(_) => {
                            join.abort();
                            results.insert(name, Err("cancelled: grace period elapsed".to_string()));
                            continue;
                        }
                    }
                }
            };

            // Actual cost is added after the connector call completes, not
            // before, so budget only ever reflects calls that were actually
            // made (a call that times out or errors still ran and is still
            // charged; a call aborted after the cancellation grace period
            // never completed and is not).
            budget.spend(cost_usd);

            match outcome {
                Ok(Ok(payloads)) => {
                    results.insert(name, Ok(payloads));
                }
                Ok(Err(e)) => {
                    results.insert(name, Err(e.to_string()));
                }
                Err(join_err) => {
                    results.insert(name, Err(format!("connector task panicked: {join_err}")));
                }
            }
        }
        results
    }

    async fn extract_and_map(&self, raw: &RawPayload, context: &ExecutionContext) -> Result<ExtractedEntity, EngineError> {
        let extractor = self.extractors.get(&raw.source).ok_or_else(|| {
            EngineError::Extraction(format!("no extractor registered for source '{}'", raw.source))
        })?;

        let primitives = extractor.extract(raw).await?;
        let primitives: Primitives = extractor.validate(primitives);
        entitylens_extract::purity::check(&primitives)?;

        let entity_class_hint = entitylens_classify::classify(&primitives);
        let mut mapped = entitylens_mapping::map(
            primitives,
            context.lens_contract.as_ref(),
            &raw.source,
            Some(entity_class_hint),
        );
        mapped.entity_class = Some(entity_class_hint);
        Ok(mapped)
    }

    fn merge_into_state(&self, state: &mut ExecutionState, new_candidates: Vec<ExtractedEntity>) {
        let mut all = std::mem::take(&mut state.candidates);
        all.extend(new_candidates);

        let trust = |source: &str| -> u8 {
            self.connector_specs.get(source).map(|s| s.trust_level).unwrap_or(0)
        };

        let output = entitylens_merge::dedup_and_merge(all, trust);
        state.candidates = output.merged;
        state.conflicts = output.conflicts;
    }
}

fn should_stop_early(request: &IngestRequest, state: &ExecutionState) -> bool {
    if state.candidates.is_empty() {
        return false;
    }
    match request.mode {
        IngestMode::ResolveOne => {
            let min_confidence = request.min_confidence.unwrap_or(0.0);
            state.candidates.iter().any(|e| e.aggregate_confidence() >= min_confidence)
        }
        IngestMode::DiscoverMany => match request.target_entity_count {
            Some(target) => state.candidates.len() as u32 >= target,
            None => false,
        },
    }
}
