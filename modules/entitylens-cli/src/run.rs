use std::process::ExitCode;

use entitylens_common::{IngestMode, IngestRequest};
use entitylens_context::ExecutionContext;
use entitylens_orchestrator::Orchestrator;
use entitylens_persist::{FailedExtraction, PersistenceCoordinator, PostgresCoordinator};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::cli::{ModeArg, RunArgs};
use crate::{demo, lens_source};

pub async fn run(args: RunArgs) -> anyhow::Result<ExitCode> {
    let (lens_id, lens_source) = match entitylens_context::resolve_lens_id(
        args.lens.as_deref(),
        None,
        Some(lens_source::DEV_FALLBACK_LENS_ID),
        args.allow_default_lens,
    ) {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(error = %e, "lens resolution failed");
            return Ok(ExitCode::from(1));
        }
    };
    info!(lens_id = %lens_id, source = ?lens_source, "resolved lens");

    let yaml = match lens_source::load_lens_document(&lens_id) {
        Ok(y) => y,
        Err(e) => {
            error!(error = %e, "failed to load lens document");
            return Ok(ExitCode::from(1));
        }
    };

    let connector_registry = demo::connector_registry();
    let lens_contract = match entitylens_loader::load_lens(&lens_id, &yaml, &connector_registry) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "lens failed validation");
            return Ok(ExitCode::from(1));
        }
    };

    if args.persist && std::env::var("DATABASE_URL").is_err() {
        error!("--persist requires DATABASE_URL to be set");
        return Ok(ExitCode::from(1));
    }

    let context = ExecutionContext::new(lens_id, lens_contract);

    let mode = match args.mode {
        ModeArg::ResolveOne => IngestMode::ResolveOne,
        ModeArg::DiscoverMany => IngestMode::DiscoverMany,
    };
    let mut request = IngestRequest::new(mode, args.query.clone());
    request.persist = args.persist;
    request.budget_usd = args.budget_usd;
    request.target_entity_count = args.target_count;
    request.min_confidence = args.min_confidence;

    let features = entitylens_planner::derive_features(&request, context.lens_contract.as_ref());
    let plan = match entitylens_planner::plan(&request, &features, context.lens_contract.as_ref(), &connector_registry) {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "planning failed");
            return Ok(ExitCode::from(1));
        }
    };

    let cancellation = CancellationToken::new();
    let ctrl_c_token = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("cancellation requested, winding down in-flight connectors");
            ctrl_c_token.cancel();
        }
    });

    let orchestrator = Orchestrator::new(connector_registry, demo::connector_handlers(&args.query), demo::extractor_registry());
    let summary = orchestrator.run(request, features, &context, &plan, cancellation).await;

    info!(
        entities = summary.entities.len(),
        conflicts = summary.conflicts.len(),
        errors = summary.errors.len(),
        budget_spent_usd = summary.budget_spent_usd,
        early_stopped = summary.early_stopped,
        cancelled = summary.cancelled,
        "run complete"
    );

    let mut persisted = 0usize;
    let mut quarantined = 0usize;
    if args.persist {
        let database_url = std::env::var("DATABASE_URL").expect("checked above");
        let coordinator = PostgresCoordinator::connect(&database_url).await?;

        for entity in &summary.entities {
            match coordinator.upsert(entity).await {
                Ok(persisted_entity) => {
                    persisted += 1;
                    info!(slug = %persisted_entity.slug, "entity persisted");
                }
                Err(e) => {
                    quarantined += 1;
                    let failure = FailedExtraction::first_failure(entity.clone(), e.to_string());
                    if let Err(q_err) = coordinator.quarantine(failure).await {
                        error!(error = %q_err, "failed to record quarantined entity");
                    }
                }
            }
        }
        for conflict in &summary.conflicts {
            if let Err(e) = coordinator.record_conflict(conflict).await {
                error!(error = %e, "failed to record merge conflict");
            }
        }
    }

    for err in &summary.errors {
        println!("error: phase={:?} connector={} message={}", err.phase, err.connector, err.message);
    }
    for entity in &summary.entities {
        println!(
            "entity: name={:?} class={:?} activities={:?}",
            entity.primitives.entity_name, entity.entity_class, entity.canonical_activities
        );
    }
    println!(
        "summary: entities={} conflicts={} errors={} persisted={} quarantined={} budget_spent_usd={:.4} early_stopped={} cancelled={}",
        summary.entities.len(),
        summary.conflicts.len(),
        summary.errors.len(),
        persisted,
        quarantined,
        summary.budget_spent_usd,
        summary.early_stopped,
        summary.cancelled,
    );

    if !summary.entities.is_empty() {
        Ok(ExitCode::from(0))
    } else if summary.errors.is_empty() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(2))
    }
}
