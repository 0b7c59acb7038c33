//! The six fail-fast validation gates (spec.md §4.1). Each gate either
//! passes silently or returns a `EngineError::LensConfig` describing the
//! first violation found. Gates run in order; later gates assume earlier
//! ones passed (e.g. Gate 5 assumes Gate 1 already confirmed the relevant
//! fields exist).

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use entitylens_common::{CanonicalDimension, EngineError};
use entitylens_connector::ConnectorRegistry;
use regex::Regex;

use crate::contract::{
    Applicability, ConnectorRule, ConnectorTrigger, ConnectorTriggerSpec, Facet, FieldRule,
    LensContract, MappingRule, ModuleDef, ModuleTrigger, TriggerCondition, ValueDef,
};
use crate::raw::{RawConnectorTrigger, RawLens};

fn config_err(reason: impl Into<String>, path: impl Into<String>) -> EngineError {
    EngineError::LensConfig {
        reason: reason.into(),
        path: path.into(),
        snippet: None,
    }
}

/// Gate 1: required top-level keys present and well-typed. Serde already
/// enforces most of this during parse (`load_lens` calls this after a
/// successful `serde_yaml::from_str`); this gate catches the cases serde's
/// "missing field" error doesn't phrase the way spec.md wants (empty
/// collections that are required to be non-empty).
pub fn gate1_schema_shape(raw: &RawLens) -> Result<(), EngineError> {
    if raw.facets.is_empty() {
        return Err(config_err("facets must not be empty", "facets"));
    }
    if raw.values.is_empty() {
        return Err(config_err("values must not be empty", "values"));
    }
    if raw.mapping_rules.is_empty() {
        return Err(config_err("mapping_rules must not be empty", "mapping_rules"));
    }
    Ok(())
}

/// Gate 4: identifier uniqueness — value keys, module keys, and field-rule
/// rule_ids (scoped within a module) must all be unique.
pub fn gate4_uniqueness(raw: &RawLens) -> Result<(), EngineError> {
    let mut seen_values = BTreeSet::new();
    for v in &raw.values {
        if !seen_values.insert(v.key.clone()) {
            return Err(config_err(
                format!("duplicate value key: {}", v.key),
                "values",
            ));
        }
    }
    // modules keys are unique by construction (BTreeMap), but rule_ids must
    // be unique within each module.
    for (module_key, module) in &raw.modules {
        let mut seen_rules = BTreeSet::new();
        for fr in &module.field_rules {
            if !seen_rules.insert(fr.rule_id.clone()) {
                return Err(config_err(
                    format!("duplicate rule_id '{}' in module '{module_key}'", fr.rule_id),
                    format!("modules.{module_key}"),
                ));
            }
        }
    }
    Ok(())
}

/// Gate 5: every mapping-rule and field-rule pattern compiles. Returns the
/// compiled forms keyed by identity so Gate-building code doesn't compile
/// twice.
pub fn gate5_compile_regexes(
    raw: &RawLens,
) -> Result<(BTreeMap<String, Regex>, BTreeMap<(String, String), Regex>), EngineError> {
    let mut mapping_patterns = BTreeMap::new();
    for r in &raw.mapping_rules {
        let re = Regex::new(&r.pattern).map_err(|e| {
            config_err(
                format!("mapping_rules[{}].pattern failed to compile: {e}", r.id),
                "mapping_rules",
            )
        })?;
        mapping_patterns.insert(r.id.clone(), re);
    }
    let mut field_patterns = BTreeMap::new();
    for (module_key, module) in &raw.modules {
        for fr in &module.field_rules {
            let re = Regex::new(&fr.pattern).map_err(|e| {
                config_err(
                    format!(
                        "modules.{module_key}.field_rules[{}].pattern failed to compile: {e}",
                        fr.rule_id
                    ),
                    format!("modules.{module_key}"),
                )
            })?;
            field_patterns.insert((module_key.clone(), fr.rule_id.clone()), re);
        }
    }
    Ok((mapping_patterns, field_patterns))
}

/// Gate 2 + Gate 3 + Gate 6, applied to the already-compiled skeleton
/// (reference integrity, connector registry membership, smoke coverage).
/// Split out of Gate 1/4/5 because these need the parsed `BTreeMap<String,
/// Facet>`/value-key set built first.
pub fn build_contract(
    raw: RawLens,
    id: String,
    content_hash: String,
    registry: &ConnectorRegistry,
) -> Result<LensContract, EngineError> {
    gate1_schema_shape(&raw)?;
    gate4_uniqueness(&raw)?;
    let (mapping_patterns, field_patterns) = gate5_compile_regexes(&raw)?;

    // --- Gate 2a: facets.dimension_source is one of the four fixed dims ---
    let mut facets = BTreeMap::new();
    for (key, f) in &raw.facets {
        let dim = CanonicalDimension::from_str(&f.dimension_source).map_err(|_| {
            config_err(
                format!(
                    "facet '{key}' has unknown dimension_source '{}'",
                    f.dimension_source
                ),
                format!("facets.{key}"),
            )
        })?;
        facets.insert(
            key.clone(),
            Facet {
                key: key.clone(),
                dimension_source: dim,
                ui_label: f.ui_label.clone(),
                display_mode: f.display_mode.clone(),
                order: f.order,
                show_in_filters: f.show_in_filters,
                show_in_navigation: f.show_in_navigation,
                icon: f.icon.clone(),
            },
        );
    }

    // --- Gate 2b: values[].facet references an existing facet ---
    let mut values = Vec::with_capacity(raw.values.len());
    let mut value_keys = BTreeSet::new();
    for v in &raw.values {
        if !facets.contains_key(&v.facet) {
            return Err(config_err(
                format!("value '{}' references unknown facet '{}'", v.key, v.facet),
                "values",
            ));
        }
        value_keys.insert(v.key.clone());
        values.push(ValueDef {
            key: v.key.clone(),
            facet: v.facet.clone(),
            display_name: v.display_name.clone(),
            description: v.description.clone(),
            seo_slug: v.seo_slug.clone(),
            search_keywords: v.search_keywords.clone(),
            icon_url: v.icon_url.clone(),
            color: v.color.clone(),
        });
    }

    // --- Gate 2c: mapping_rules[].canonical references an existing value key ---
    let mut mapping_rules = Vec::with_capacity(raw.mapping_rules.len());
    for r in &raw.mapping_rules {
        if !value_keys.contains(&r.canonical) {
            return Err(config_err(
                format!(
                    "mapping_rule '{}' references unknown canonical value '{}'",
                    r.id, r.canonical
                ),
                "mapping_rules",
            ));
        }
        let dimension = CanonicalDimension::from_str(&r.dimension).map_err(|_| {
            config_err(
                format!("mapping_rule '{}' has unknown dimension '{}'", r.id, r.dimension),
                "mapping_rules",
            )
        })?;
        mapping_rules.push(MappingRule {
            id: r.id.clone(),
            pattern: mapping_patterns.get(&r.id).expect("compiled above").clone(),
            canonical: r.canonical.clone(),
            dimension,
            confidence: r.confidence,
            source_fields: r.source_fields.clone(),
        });
    }

    // --- modules (field rules, no cross-references to validate yet) ---
    let mut modules = BTreeMap::new();
    for (module_key, m) in &raw.modules {
        let mut field_rules = Vec::with_capacity(m.field_rules.len());
        for fr in &m.field_rules {
            let extractor = crate::contract::ExtractorKind::from_str(&fr.extractor).map_err(|_| {
                config_err(
                    format!(
                        "modules.{module_key}.field_rules[{}] has unknown extractor '{}'",
                        fr.rule_id, fr.extractor
                    ),
                    format!("modules.{module_key}"),
                )
            })?;
            field_rules.push(FieldRule {
                rule_id: fr.rule_id.clone(),
                target_path: fr.target_path.clone(),
                extractor,
                pattern: field_patterns
                    .get(&(module_key.clone(), fr.rule_id.clone()))
                    .expect("compiled above")
                    .clone(),
                source_fields: fr.source_fields.clone(),
                confidence: fr.confidence,
                applicability: Applicability {
                    source: fr.applicability.source.clone(),
                    entity_class: fr.applicability.entity_class.clone(),
                },
                normalizers: fr.normalizers.clone(),
            });
        }
        modules.insert(
            module_key.clone(),
            ModuleDef {
                key: module_key.clone(),
                description: m.description.clone(),
                field_rules,
            },
        );
    }

    // --- Gate 2d: module_triggers reference existing values and modules ---
    let mut module_triggers = Vec::with_capacity(raw.module_triggers.len());
    for (i, t) in raw.module_triggers.iter().enumerate() {
        if !value_keys.contains(&t.when.value) {
            return Err(config_err(
                format!(
                    "module_triggers[{i}] references unknown value '{}'",
                    t.when.value
                ),
                "module_triggers",
            ));
        }
        if !facets.contains_key(&t.when.facet) {
            return Err(config_err(
                format!(
                    "module_triggers[{i}] references unknown facet '{}'",
                    t.when.facet
                ),
                "module_triggers",
            ));
        }
        for m in &t.add_modules {
            if !modules.contains_key(m) {
                return Err(config_err(
                    format!("module_triggers[{i}] references unknown module '{m}'"),
                    "module_triggers",
                ));
            }
        }
        module_triggers.push(ModuleTrigger {
            facet: t.when.facet.clone(),
            value: t.when.value.clone(),
            add_modules: t.add_modules.clone(),
            conditions: t
                .conditions
                .iter()
                .map(|c| TriggerCondition {
                    entity_class: c.entity_class.clone(),
                })
                .collect(),
        });
    }

    // --- Gate 3: connector_rules names resolve in the connector registry ---
    let mut connector_rules = BTreeMap::new();
    for (name, rule) in &raw.connector_rules {
        if !registry.contains(name) {
            return Err(config_err(
                format!("connector_rules references unknown connector '{name}'"),
                "connector_rules",
            ));
        }
        let triggers = rule
            .triggers
            .iter()
            .map(|t| match t {
                RawConnectorTrigger::AnyKeywordMatch { keywords } => ConnectorTriggerSpec {
                    kind: ConnectorTrigger::AnyKeywordMatch,
                    keywords: keywords.clone(),
                    mode: None,
                },
                RawConnectorTrigger::AllKeywordMatch { keywords } => ConnectorTriggerSpec {
                    kind: ConnectorTrigger::AllKeywordMatch,
                    keywords: keywords.clone(),
                    mode: None,
                },
                RawConnectorTrigger::GeographicMatch => ConnectorTriggerSpec {
                    kind: ConnectorTrigger::GeographicMatch,
                    keywords: Vec::new(),
                    mode: None,
                },
                RawConnectorTrigger::CategorySearch => ConnectorTriggerSpec {
                    kind: ConnectorTrigger::CategorySearch,
                    keywords: Vec::new(),
                    mode: None,
                },
                RawConnectorTrigger::ModeIs { mode } => ConnectorTriggerSpec {
                    kind: ConnectorTrigger::ModeIs,
                    keywords: Vec::new(),
                    mode: Some(mode.clone()),
                },
            })
            .collect();
        connector_rules.insert(
            name.clone(),
            ConnectorRule {
                priority: rule.priority,
                triggers,
            },
        );
    }

    // --- Gate 6: smoke coverage — every facet has >=1 value and >=1 rule
    // (direct mapping rule or module field rule) that could populate it.
    for (facet_key, facet) in &facets {
        let has_value = values.iter().any(|v| &v.facet == facet_key);
        if !has_value {
            return Err(config_err(
                format!("facet '{facet_key}' has no values"),
                format!("facets.{facet_key}"),
            ));
        }
        let canonicals_in_facet: BTreeSet<&str> = values
            .iter()
            .filter(|v| &v.facet == facet_key)
            .map(|v| v.key.as_str())
            .collect();
        let has_direct_rule = mapping_rules
            .iter()
            .any(|r| canonicals_in_facet.contains(r.canonical.as_str()));
        let has_module_path = module_triggers
            .iter()
            .any(|t| &t.facet == facet_key && canonicals_in_facet.contains(t.value.as_str()))
            && !modules.is_empty();
        if !has_direct_rule && !has_module_path {
            return Err(config_err(
                format!(
                    "facet '{facet_key}' ({}) has no mapping_rule or module_trigger that could populate it",
                    facet.dimension_source.as_str()
                ),
                format!("facets.{facet_key}"),
            ));
        }
    }

    Ok(LensContract {
        id,
        content_hash,
        schema_version: raw.schema.version.clone(),
        facets,
        values,
        mapping_rules,
        modules,
        module_triggers,
        connector_rules,
        vocabulary: raw.vocabulary.clone(),
    })
}
