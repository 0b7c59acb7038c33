use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use entitylens_common::{EngineError, Entity, EntityClass, ModuleMap, Primitives};
use sqlx::types::Json;
use uuid::Uuid;

/// Wire shape of an `entities` row. JSONB columns are carried through
/// `sqlx::types::Json` so sqlx (de)serializes them for us; `entity_class`
/// is stored as plain text rather than a Postgres enum so new classes never
/// require a migration.
#[derive(Debug, sqlx::FromRow)]
pub struct EntityRow {
    pub id: Uuid,
    pub slug: String,
    pub entity_class: String,
    pub entity_name: String,
    pub primitives: Json<Primitives>,
    pub canonical_activities: Vec<String>,
    pub canonical_roles: Vec<String>,
    pub canonical_place_types: Vec<String>,
    pub canonical_access: Vec<String>,
    pub modules: Json<BTreeMap<String, ModuleMap>>,
    pub field_confidence: Json<BTreeMap<String, f64>>,
    pub source_info: Json<BTreeMap<String, String>>,
    pub external_ids: Json<BTreeMap<String, String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EntityRow {
    pub fn into_entity(self) -> Result<Entity, EngineError> {
        let entity_class = EntityClass::from_str(&self.entity_class)
            .map_err(|e| EngineError::Persistence(format!("corrupt entity_class column: {e}")))?;
        Ok(Entity {
            id: self.id,
            slug: self.slug,
            entity_class,
            entity_name: self.entity_name,
            primitives: self.primitives.0,
            canonical_activities: self.canonical_activities,
            canonical_roles: self.canonical_roles,
            canonical_place_types: self.canonical_place_types,
            canonical_access: self.canonical_access,
            modules: self.modules.0,
            field_confidence: self.field_confidence.0,
            source_info: self.source_info.0,
            external_ids: self.external_ids.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
