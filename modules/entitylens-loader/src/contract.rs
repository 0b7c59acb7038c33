//! The immutable, deep-frozen `LensContract` — the compiled, validated form
//! of a lens document. Constructed once at bootstrap by `load_lens`, never
//! mutated, destroyed at process exit (spec.md §3/§4.1).

use std::collections::BTreeMap;

use regex::Regex;

/// One of the four fixed universal dimensions a facet is bound to.
pub use entitylens_common::CanonicalDimension;

#[derive(Debug, Clone)]
pub struct Facet {
    pub key: String,
    pub dimension_source: CanonicalDimension,
    pub ui_label: String,
    pub display_mode: String,
    pub order: i32,
    pub show_in_filters: bool,
    pub show_in_navigation: bool,
    pub icon: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ValueDef {
    pub key: String,
    pub facet: String,
    pub display_name: String,
    pub description: Option<String>,
    pub seo_slug: String,
    pub search_keywords: Vec<String>,
    pub icon_url: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MappingRule {
    pub id: String,
    pub pattern: Regex,
    pub canonical: String,
    pub dimension: CanonicalDimension,
    pub confidence: f64,
    pub source_fields: Option<Vec<String>>,
}

/// Dispatch tag for a field rule's extraction strategy. Tagged variant,
/// not runtime type introspection, per spec.md §9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    RegexCapture,
    NumericParser,
}

impl std::str::FromStr for ExtractorKind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regex_capture" => Ok(Self::RegexCapture),
            "numeric_parser" => Ok(Self::NumericParser),
            other => Err(format!("unknown extractor kind: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Applicability {
    pub source: Vec<String>,
    pub entity_class: Vec<String>,
}

impl Applicability {
    pub fn matches_source(&self, source_name: &str) -> bool {
        self.source.is_empty() || self.source.iter().any(|s| s == source_name)
    }

    pub fn matches_entity_class(&self, entity_class: Option<&str>) -> bool {
        if self.entity_class.is_empty() {
            return true;
        }
        match entity_class {
            Some(ec) => self.entity_class.iter().any(|e| e == ec),
            None => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FieldRule {
    pub rule_id: String,
    pub target_path: String,
    pub extractor: ExtractorKind,
    pub pattern: Regex,
    pub source_fields: Vec<String>,
    pub confidence: f64,
    pub applicability: Applicability,
    pub normalizers: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ModuleDef {
    pub key: String,
    pub description: Option<String>,
    pub field_rules: Vec<FieldRule>,
}

#[derive(Debug, Clone)]
pub struct TriggerCondition {
    pub entity_class: Option<String>,
}

impl TriggerCondition {
    pub fn matches(&self, entity_class: Option<&str>) -> bool {
        match (&self.entity_class, entity_class) {
            (None, _) => true,
            (Some(want), Some(have)) => want == have,
            (Some(_), None) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModuleTrigger {
    pub facet: String,
    pub value: String,
    pub add_modules: Vec<String>,
    pub conditions: Vec<TriggerCondition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorTrigger {
    AnyKeywordMatch,
    AllKeywordMatch,
    GeographicMatch,
    CategorySearch,
    ModeIs,
}

#[derive(Debug, Clone)]
pub struct ConnectorTriggerSpec {
    pub kind: ConnectorTrigger,
    pub keywords: Vec<String>,
    pub mode: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConnectorRule {
    pub priority: u32,
    pub triggers: Vec<ConnectorTriggerSpec>,
}

/// The compiled, validated, immutable domain contract. Constructed once at
/// bootstrap; shared read-only thereafter (never behind a `Mutex` — there
/// is nothing in here that ever changes).
#[derive(Debug, Clone)]
pub struct LensContract {
    pub id: String,
    pub content_hash: String,
    pub schema_version: String,
    pub facets: BTreeMap<String, Facet>,
    pub values: Vec<ValueDef>,
    pub mapping_rules: Vec<MappingRule>,
    pub modules: BTreeMap<String, ModuleDef>,
    pub module_triggers: Vec<ModuleTrigger>,
    pub connector_rules: BTreeMap<String, ConnectorRule>,
    pub vocabulary: Vec<String>,
}

impl LensContract {
    pub fn value(&self, key: &str) -> Option<&ValueDef> {
        self.values.iter().find(|v| v.key == key)
    }

    pub fn facet_of_value(&self, key: &str) -> Option<&Facet> {
        let v = self.value(key)?;
        self.facets.get(&v.facet)
    }

    /// All known value keys, in declaration order — used by the Planner to
    /// intersect the query against lens vocabulary.
    pub fn value_keys(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|v| v.key.as_str())
    }
}
