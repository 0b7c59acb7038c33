use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// The universal schema fields the engine understands structurally.
/// This is the fixed "primitive set" referenced throughout spec.md —
/// extractor purity is defined relative to it (see entitylens-extract).
pub const PRIMITIVE_SET: &[&str] = &[
    "entity_name",
    "given_name",
    "family_name",
    "organization_name",
    "description",
    "summary",
    "raw_categories",
    "street_address",
    "city",
    "postcode",
    "latitude",
    "longitude",
    "phone",
    "email",
    "website_url",
    "time_range_start",
    "time_range_end",
];

pub fn is_primitive_key(key: &str) -> bool {
    PRIMITIVE_SET.contains(&key)
        || key == "raw_observations"
        || key == "external_ids"
        || key == "structural_counts"
}

/// Output of a Primitive Extractor (C6). Contains only universal schema
/// fields, opaque connector-native passthrough, and non-interpretive
/// structural counts. No canonical dimensions, no modules — enforced by
/// the purity contract test in `entitylens-extract`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Primitives {
    pub entity_name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub organization_name: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub raw_categories: Vec<String>,
    pub street_address: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website_url: Option<String>,
    pub time_range_start: Option<chrono::DateTime<chrono::Utc>>,
    pub time_range_end: Option<chrono::DateTime<chrono::Utc>>,

    /// Opaque connector-native fields, copied through untouched.
    pub raw_observations: BTreeMap<String, serde_json::Value>,
    /// Source-scoped stable identifiers, e.g. `{"osm": "node/123"}`.
    pub external_ids: BTreeMap<String, String>,
    /// Non-interpretive counts of present schema fields (never derived from
    /// vocabulary or meaning — e.g. "3 of 5 address fields present").
    pub structural_counts: HashMap<String, u32>,
}

impl Primitives {
    /// Searchable text fields in the default order used by mapping rules
    /// when `source_fields` is omitted (spec.md §4.7 Step A).
    pub fn default_search_fields(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(v) = &self.entity_name {
            out.push(("entity_name", v.as_str()));
        }
        if let Some(v) = &self.description {
            out.push(("description", v.as_str()));
        }
        for v in &self.raw_categories {
            out.push(("raw_categories", v.as_str()));
        }
        if let Some(v) = &self.summary {
            out.push(("summary", v.as_str()));
        }
        if let Some(v) = &self.street_address {
            out.push(("street_address", v.as_str()));
        }
        out
    }

    pub fn has_geography(&self) -> bool {
        (self.latitude.is_some() && self.longitude.is_some()) || self.street_address.is_some()
    }

    pub fn has_person_name(&self) -> bool {
        self.given_name.is_some() || self.family_name.is_some()
    }

    pub fn has_organization_name(&self) -> bool {
        self.organization_name.is_some()
    }

    pub fn has_time_range(&self) -> bool {
        self.time_range_start.is_some() || self.time_range_end.is_some()
    }

    pub fn has_name(&self) -> bool {
        self.entity_name.is_some()
    }
}
