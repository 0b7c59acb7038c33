use async_trait::async_trait;
use chrono::Utc;
use entitylens_common::{EngineError, Entity, ExtractedEntity};
use entitylens_merge::MergeConflict;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::quarantine::FailedExtraction;
use crate::row::EntityRow;
use crate::slug::derive_slug;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// The seam the Orchestrator/CLI invoke to make a merged candidate durable.
/// A trait (rather than a bare `PostgresCoordinator` handle) so tests can
/// substitute an in-memory fake without a live database (spec.md §4.10).
#[async_trait]
pub trait PersistenceCoordinator: Send + Sync {
    async fn upsert(&self, candidate: &ExtractedEntity) -> Result<Entity, EngineError>;
    async fn quarantine(&self, failure: FailedExtraction) -> Result<(), EngineError>;
    async fn record_conflict(&self, conflict: &MergeConflict) -> Result<(), EngineError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Entity>, EngineError>;
}

/// Postgres-backed coordinator. Idempotent upsert by slug: Postgres's own
/// unique-index conflict resolution gives per-slug linearizability without
/// an application-level lock (spec.md §5 "Persistence access is serialized
/// per slug").
pub struct PostgresCoordinator {
    pool: PgPool,
}

impl PostgresCoordinator {
    pub async fn connect(database_url: &str) -> Result<Self, EngineError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| EngineError::Persistence(format!("failed to connect: {e}")))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| EngineError::Persistence(format!("migration failed: {e}")))?;
        info!("persistence schema migrated");

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceCoordinator for PostgresCoordinator {
    async fn upsert(&self, candidate: &ExtractedEntity) -> Result<Entity, EngineError> {
        let slug = derive_slug(candidate);
        let id = Uuid::new_v4();
        let now = Utc::now();
        let entity_class = candidate.entity_class.map(|c| c.to_string()).unwrap_or_else(|| "thing".to_string());
        let entity_name = candidate
            .primitives
            .entity_name
            .clone()
            .unwrap_or_else(|| "unnamed".to_string());

        let row: EntityRow = sqlx::query_as(
            r#"
            INSERT INTO entities (
                id, slug, entity_class, entity_name, primitives,
                canonical_activities, canonical_roles, canonical_place_types, canonical_access,
                modules, field_confidence, source_info, external_ids,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
            ON CONFLICT (slug) DO UPDATE SET
                entity_class = EXCLUDED.entity_class,
                entity_name = EXCLUDED.entity_name,
                primitives = EXCLUDED.primitives,
                canonical_activities = EXCLUDED.canonical_activities,
                canonical_roles = EXCLUDED.canonical_roles,
                canonical_place_types = EXCLUDED.canonical_place_types,
                canonical_access = EXCLUDED.canonical_access,
                modules = EXCLUDED.modules,
                field_confidence = EXCLUDED.field_confidence,
                source_info = EXCLUDED.source_info,
                external_ids = EXCLUDED.external_ids,
                updated_at = EXCLUDED.updated_at
            RETURNING
                id, slug, entity_class, entity_name, primitives,
                canonical_activities, canonical_roles, canonical_place_types, canonical_access,
                modules, field_confidence, source_info, external_ids,
                created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&slug)
        .bind(&entity_class)
        .bind(&entity_name)
        .bind(Json(&candidate.primitives))
        .bind(&candidate.canonical_activities)
        .bind(&candidate.canonical_roles)
        .bind(&candidate.canonical_place_types)
        .bind(&candidate.canonical_access)
        .bind(Json(&candidate.modules))
        .bind(Json(&candidate.field_confidence))
        .bind(Json(&candidate.source_info))
        .bind(Json(&candidate.external_ids))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| EngineError::Persistence(format!("upsert failed for slug '{slug}': {e}")))?;

        row.into_entity()
    }

    async fn quarantine(&self, failure: FailedExtraction) -> Result<(), EngineError> {
        let snapshot = serde_json::to_value(&failure.entity_snapshot)
            .map_err(|e| EngineError::Persistence(format!("failed to serialize quarantine snapshot: {e}")))?;

        warn!(error = %failure.error, retry_count = failure.retry_count, "quarantining failed extraction");

        sqlx::query(
            r#"
            INSERT INTO quarantined_extractions (id, entity_snapshot, error, retry_count, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(snapshot)
        .bind(&failure.error)
        .bind(failure.retry_count as i32)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::Persistence(format!("failed to record quarantine row: {e}")))?;

        Ok(())
    }

    async fn record_conflict(&self, conflict: &MergeConflict) -> Result<(), EngineError> {
        let a = serde_json::to_value(&conflict.candidate_a)
            .map_err(|e| EngineError::Persistence(format!("failed to serialize conflict candidate: {e}")))?;
        let b = serde_json::to_value(&conflict.candidate_b)
            .map_err(|e| EngineError::Persistence(format!("failed to serialize conflict candidate: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO merge_conflicts (id, candidate_a, candidate_b, reason, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(a)
        .bind(b)
        .bind(&conflict.reason)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| EngineError::Persistence(format!("failed to record merge conflict: {e}")))?;

        Ok(())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Entity>, EngineError> {
        let row: Option<EntityRow> = sqlx::query_as(
            r#"
            SELECT
                id, slug, entity_class, entity_name, primitives,
                canonical_activities, canonical_roles, canonical_place_types, canonical_access,
                modules, field_confidence, source_info, external_ids,
                created_at, updated_at
            FROM entities
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngineError::Persistence(format!("lookup failed for slug '{slug}': {e}")))?;

        row.map(EntityRow::into_entity).transpose()
    }
}
