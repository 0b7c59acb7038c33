//! Serde-shape of the lens YAML document, before regex compilation and
//! reference-integrity validation. `load_lens` parses into these types
//! first (Gate 1), then builds the immutable `LensContract` by running
//! Gates 2–6 against them.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct RawLens {
    pub schema: RawSchema,
    pub facets: BTreeMap<String, RawFacet>,
    pub values: Vec<RawValue>,
    pub mapping_rules: Vec<RawMappingRule>,
    #[serde(default)]
    pub modules: BTreeMap<String, RawModule>,
    #[serde(default)]
    pub module_triggers: Vec<RawModuleTrigger>,
    #[serde(default)]
    pub connector_rules: BTreeMap<String, RawConnectorRule>,
    #[serde(default)]
    pub vocabulary: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSchema {
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFacet {
    pub dimension_source: String,
    pub ui_label: String,
    #[serde(default = "default_display_mode")]
    pub display_mode: String,
    #[serde(default)]
    pub order: i32,
    #[serde(default = "default_true")]
    pub show_in_filters: bool,
    #[serde(default)]
    pub show_in_navigation: bool,
    #[serde(default)]
    pub icon: Option<String>,
}

fn default_display_mode() -> String {
    "chips".to_string()
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawValue {
    pub key: String,
    pub facet: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub seo_slug: String,
    #[serde(default)]
    pub search_keywords: Vec<String>,
    #[serde(default)]
    pub icon_url: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMappingRule {
    pub id: String,
    pub pattern: String,
    pub canonical: String,
    pub dimension: String,
    pub confidence: f64,
    #[serde(default)]
    pub source_fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModule {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub field_rules: Vec<RawFieldRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawFieldRule {
    pub rule_id: String,
    pub target_path: String,
    pub extractor: String,
    pub pattern: String,
    #[serde(default)]
    pub source_fields: Vec<String>,
    pub confidence: f64,
    #[serde(default)]
    pub applicability: RawApplicability,
    #[serde(default)]
    pub normalizers: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawApplicability {
    #[serde(default)]
    pub source: Vec<String>,
    #[serde(default)]
    pub entity_class: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawModuleTrigger {
    pub when: RawTriggerWhen,
    #[serde(default)]
    pub add_modules: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<RawTriggerCondition>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTriggerWhen {
    pub facet: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTriggerCondition {
    pub entity_class: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawConnectorRule {
    pub priority: u32,
    #[serde(default)]
    pub triggers: Vec<RawConnectorTrigger>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RawConnectorTrigger {
    AnyKeywordMatch { keywords: Vec<String> },
    AllKeywordMatch { keywords: Vec<String> },
    GeographicMatch,
    CategorySearch,
    ModeIs { mode: String },
}
