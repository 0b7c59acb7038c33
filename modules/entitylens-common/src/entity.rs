use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::primitives::Primitives;

/// The four fixed, universal canonical dimensions. The engine knows these
/// four names; it knows no values within them (those come from the lens).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalDimension {
    Activities,
    Roles,
    PlaceTypes,
    Access,
}

impl CanonicalDimension {
    pub const ALL: [CanonicalDimension; 4] = [
        CanonicalDimension::Activities,
        CanonicalDimension::Roles,
        CanonicalDimension::PlaceTypes,
        CanonicalDimension::Access,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalDimension::Activities => "activities",
            CanonicalDimension::Roles => "roles",
            CanonicalDimension::PlaceTypes => "place_types",
            CanonicalDimension::Access => "access",
        }
    }
}

impl std::str::FromStr for CanonicalDimension {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "activities" => Ok(Self::Activities),
            "roles" => Ok(Self::Roles),
            "place_types" => Ok(Self::PlaceTypes),
            "access" => Ok(Self::Access),
            other => Err(format!("unknown canonical dimension: {other}")),
        }
    }
}

/// Structural classification, assigned by the Classifier (C8) from
/// primitives only — no domain vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityClass {
    Place,
    Person,
    Organization,
    Event,
    Thing,
}

impl std::str::FromStr for EntityClass {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "place" => Ok(Self::Place),
            "person" => Ok(Self::Person),
            "organization" => Ok(Self::Organization),
            "event" => Ok(Self::Event),
            "thing" => Ok(Self::Thing),
            other => Err(format!("unknown entity class: {other}")),
        }
    }
}

impl std::fmt::Display for EntityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EntityClass::Place => "place",
            EntityClass::Person => "person",
            EntityClass::Organization => "organization",
            EntityClass::Event => "event",
            EntityClass::Thing => "thing",
        };
        write!(f, "{s}")
    }
}

/// A nested, module-namespaced bag of fields: `modules[module_key][target_path] = value`.
/// `target_path` may itself be dot-notation, so the leaf map nests further.
pub type ModuleMap = BTreeMap<String, serde_json::Value>;

/// Primitives enriched by the Mapping Engine (C7) with canonical dimensions,
/// modules, and per-field provenance. One `ExtractedEntity` per (source,
/// payload) pair, before cross-source dedup/merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedEntity {
    pub primitives: Primitives,

    pub canonical_activities: Vec<String>,
    pub canonical_roles: Vec<String>,
    pub canonical_place_types: Vec<String>,
    pub canonical_access: Vec<String>,

    pub modules: BTreeMap<String, ModuleMap>,
    pub field_confidence: BTreeMap<String, f64>,
    pub source_info: BTreeMap<String, String>,
    pub external_ids: BTreeMap<String, String>,

    pub entity_class: Option<EntityClass>,
    pub source_name: String,
}

impl ExtractedEntity {
    pub fn new(primitives: Primitives, source_name: impl Into<String>) -> Self {
        let external_ids = primitives.external_ids.clone();
        Self {
            primitives,
            canonical_activities: Vec::new(),
            canonical_roles: Vec::new(),
            canonical_place_types: Vec::new(),
            canonical_access: Vec::new(),
            modules: BTreeMap::new(),
            field_confidence: BTreeMap::new(),
            source_info: BTreeMap::new(),
            external_ids,
            entity_class: None,
            source_name: source_name.into(),
        }
    }

    pub fn dimension_mut(&mut self, dim: CanonicalDimension) -> &mut Vec<String> {
        match dim {
            CanonicalDimension::Activities => &mut self.canonical_activities,
            CanonicalDimension::Roles => &mut self.canonical_roles,
            CanonicalDimension::PlaceTypes => &mut self.canonical_place_types,
            CanonicalDimension::Access => &mut self.canonical_access,
        }
    }

    pub fn dimension(&self, dim: CanonicalDimension) -> &[String] {
        match dim {
            CanonicalDimension::Activities => &self.canonical_activities,
            CanonicalDimension::Roles => &self.canonical_roles,
            CanonicalDimension::PlaceTypes => &self.canonical_place_types,
            CanonicalDimension::Access => &self.canonical_access,
        }
    }

    /// Mean of recorded field confidences; used for early-stop in
    /// `resolve_one` mode. Entities with no confidences recorded default to
    /// 0.0 (never trivially satisfies a `min_confidence` threshold).
    pub fn aggregate_confidence(&self) -> f64 {
        if self.field_confidence.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.field_confidence.values().sum();
        sum / self.field_confidence.len() as f64
    }
}

/// Canonical, persisted entity — one per real-world thing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: uuid::Uuid,
    pub slug: String,
    pub entity_class: EntityClass,
    pub entity_name: String,

    pub primitives: Primitives,

    pub canonical_activities: Vec<String>,
    pub canonical_roles: Vec<String>,
    pub canonical_place_types: Vec<String>,
    pub canonical_access: Vec<String>,

    pub modules: BTreeMap<String, ModuleMap>,
    pub field_confidence: BTreeMap<String, f64>,
    pub source_info: BTreeMap<String, String>,
    pub external_ids: BTreeMap<String, String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity {
    pub fn dimension(&self, dim: CanonicalDimension) -> &[String] {
        match dim {
            CanonicalDimension::Activities => &self.canonical_activities,
            CanonicalDimension::Roles => &self.canonical_roles,
            CanonicalDimension::PlaceTypes => &self.canonical_place_types,
            CanonicalDimension::Access => &self.canonical_access,
        }
    }
}
