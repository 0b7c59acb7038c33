use std::collections::{BTreeMap, BTreeSet};

use entitylens_common::{EngineError, IngestMode, IngestRequest, QueryFeatures};
use entitylens_connector::{ConnectorRegistry, ConnectorSpec, Phase};
use entitylens_loader::{ConnectorTrigger, LensContract};
use tracing::debug;

/// An edge `from → to` meaning `from` must complete before `to` runs,
/// derived from `requires[]` entries beginning with `context.` (data-only
/// `request.`/`query_features.` requirements never create edges).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    pub connectors: Vec<ConnectorSpec>,
    pub phase_map: BTreeMap<Phase, Vec<String>>,
    pub dep_graph: Vec<DependencyEdge>,
    pub est_budget_usd: f64,
}

impl ExecutionPlan {
    pub fn connectors_in_phase(&self, phase: Phase) -> Vec<&ConnectorSpec> {
        self.phase_map
            .get(&phase)
            .into_iter()
            .flatten()
            .filter_map(|name| self.connectors.iter().find(|c| &c.name == name))
            .collect()
    }
}

/// Build the execution plan: select connectors by lens rules, assign
/// phases, infer dependencies, estimate budget. Pure — no IO (spec.md §4.3).
pub fn plan(
    request: &IngestRequest,
    features: &QueryFeatures,
    lens: &LensContract,
    registry: &ConnectorRegistry,
) -> Result<ExecutionPlan, EngineError> {
    let mut selected: BTreeMap<String, (u32, ConnectorSpec)> = BTreeMap::new();

    for (name, rule) in &lens.connector_rules {
        let spec = registry.get(name).ok_or_else(|| {
            EngineError::Planning(format!("connector '{name}' not found in registry at plan time"))
        })?;

        if !mode_allows(request.mode, spec) {
            continue;
        }

        let matched = rule
            .triggers
            .iter()
            .any(|t| trigger_matches(t.kind, &t.keywords, t.mode.as_deref(), request, features));

        if matched {
            selected.insert(name.clone(), (rule.priority, spec.clone()));
        }
    }

    if selected.is_empty() {
        debug!("no connectors matched any trigger for this query");
    }

    let mut connectors: Vec<ConnectorSpec> = selected.values().map(|(_, s)| s.clone()).collect();

    if let Some(budget) = request.budget_usd {
        connectors = apply_cost_benefit_filter(connectors, &selected, budget);
    }

    validate_no_forward_phase_dependency(&connectors)?;
    let dep_graph = infer_dependencies(&connectors);

    let mut phase_map: BTreeMap<Phase, Vec<String>> = BTreeMap::new();
    for phase in Phase::ORDER {
        let mut names: Vec<String> = connectors
            .iter()
            .filter(|c| c.phase == phase)
            .map(|c| c.name.clone())
            .collect();
        names.sort(); // alphabetical, deterministic within a phase
        phase_map.insert(phase, names);
    }

    let est_budget_usd = connectors.iter().map(estimate_connector_cost).sum();

    Ok(ExecutionPlan {
        connectors,
        phase_map,
        dep_graph,
        est_budget_usd,
    })
}

fn mode_allows(mode: IngestMode, spec: &ConnectorSpec) -> bool {
    match mode {
        // DISCOVER_MANY adds breadth-oriented discovery connectors by policy.
        IngestMode::DiscoverMany => true,
        // RESOLVE_ONE restricts to enrichment-capable connectors (structured
        // and enrichment phases; discovery connectors are bypassed since the
        // target entity is already named in the query).
        IngestMode::ResolveOne => spec.phase != Phase::Discovery,
    }
}

fn trigger_matches(
    kind: ConnectorTrigger,
    keywords: &[String],
    trigger_mode: Option<&str>,
    request: &IngestRequest,
    features: &QueryFeatures,
) -> bool {
    match kind {
        ConnectorTrigger::AnyKeywordMatch => keywords
            .iter()
            .any(|k| features.detected_keywords.iter().any(|d| d == k)),
        ConnectorTrigger::AllKeywordMatch => keywords
            .iter()
            .all(|k| features.detected_keywords.iter().any(|d| d == k)),
        ConnectorTrigger::GeographicMatch => !features.geographic_hints.is_empty(),
        ConnectorTrigger::CategorySearch => features.looks_like_category_search,
        ConnectorTrigger::ModeIs => {
            let want = match request.mode {
                IngestMode::ResolveOne => "resolve_one",
                IngestMode::DiscoverMany => "discover_many",
            };
            trigger_mode == Some(want)
        }
    }
}

/// Sort by `trust_level / (cost + ε)` descending, keep connectors whose
/// cumulative cost stays within budget, but always retain at least the
/// highest-priority connector per phase.
fn apply_cost_benefit_filter(
    mut connectors: Vec<ConnectorSpec>,
    priorities: &BTreeMap<String, (u32, ConnectorSpec)>,
    budget: f64,
) -> Vec<ConnectorSpec> {
    let must_keep: BTreeSet<String> = Phase::ORDER
        .iter()
        .filter_map(|phase| {
            connectors
                .iter()
                .filter(|c| c.phase == *phase)
                .min_by_key(|c| priorities.get(&c.name).map(|(p, _)| *p).unwrap_or(u32::MAX))
                .map(|c| c.name.clone())
        })
        .collect();

    connectors.sort_by(|a, b| {
        b.trust_cost_ratio()
            .partial_cmp(&a.trust_cost_ratio())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept = Vec::new();
    let mut cumulative = 0.0;
    for c in connectors {
        let is_required = must_keep.contains(&c.name);
        if is_required || cumulative + c.cost_per_call_usd <= budget {
            cumulative += c.cost_per_call_usd;
            kept.push(c);
        }
    }
    kept
}

fn estimate_connector_cost(spec: &ConnectorSpec) -> f64 {
    // Single expected call per connector per run; connectors that fan out
    // internally (paginated search, etc.) are expected to report their own
    // actual cost back to the orchestrator post-completion.
    spec.cost_per_call_usd
}

/// `requires[]` entries beginning with `context.` create an edge from any
/// connector whose `provides[]` lists the same key. `request.`/
/// `query_features.` entries are data-only.
fn infer_dependencies(connectors: &[ConnectorSpec]) -> Vec<DependencyEdge> {
    let mut edges = BTreeSet::new();
    for dependent in connectors {
        for req in &dependent.requires {
            let Some(key) = req.strip_prefix("context.") else {
                continue;
            };
            for provider in connectors {
                if provider.name == dependent.name {
                    continue;
                }
                if provider.provides.iter().any(|p| p == key) {
                    edges.insert(DependencyEdge {
                        from: provider.name.clone(),
                        to: dependent.name.clone(),
                    });
                }
            }
        }
    }
    edges.into_iter().collect()
}

/// Validate that no connector depends on a connector in a later phase: a
/// phase-N connector may not depend on phase-N or later data (spec.md §4.4:
/// "no connector in phase N may depend on data from phase N; dependencies
/// must point backward").
fn validate_no_forward_phase_dependency(connectors: &[ConnectorSpec]) -> Result<(), EngineError> {
    let phase_of: BTreeMap<&str, Phase> =
        connectors.iter().map(|c| (c.name.as_str(), c.phase)).collect();

    for dependent in connectors {
        for req in &dependent.requires {
            let Some(key) = req.strip_prefix("context.") else {
                continue;
            };
            for provider in connectors {
                if provider.name == dependent.name {
                    continue;
                }
                if provider.provides.iter().any(|p| p == key) {
                    let provider_phase = phase_of.get(provider.name.as_str()).copied();
                    if provider_phase.map(|p| p >= dependent.phase).unwrap_or(false) {
                        return Err(EngineError::Planning(format!(
                            "dependency cycle/forward reference: '{}' ({:?}) requires \
                             context.'{key}' from '{}' ({:?}), which does not run strictly earlier",
                            dependent.name, dependent.phase, provider.name, provider_phase
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}
