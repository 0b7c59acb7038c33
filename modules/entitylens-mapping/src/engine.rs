use std::collections::BTreeSet;

use entitylens_common::{CanonicalDimension, EntityClass, ExtractedEntity, Primitives};
use entitylens_loader::{ExtractorKind, FieldRule, LensContract};

use crate::fields::{field_text, DEFAULT_SEARCH_FIELDS};
use crate::normalize::{apply_normalizers, Extracted};
use crate::path;

/// Map raw primitives into a fully dimensioned, module-enriched
/// `ExtractedEntity` (spec.md §4.7). Deterministic: identical inputs and an
/// identical lens `content_hash` always produce byte-identical output.
pub fn map(
    primitives: Primitives,
    lens: &LensContract,
    source_name: &str,
    entity_class_hint: Option<EntityClass>,
) -> ExtractedEntity {
    let mut entity = ExtractedEntity::new(primitives, source_name);

    run_mapping_rules(&mut entity, lens);
    stabilize_dimensions(&mut entity);

    let active_modules = active_modules(&entity, lens, entity_class_hint);
    run_module_field_rules(&mut entity, lens, &active_modules, source_name, entity_class_hint);

    entity
}

/// Step A.
fn run_mapping_rules(entity: &mut ExtractedEntity, lens: &LensContract) {
    for rule in &lens.mapping_rules {
        let Some(facet) = lens.facet_of_value(&rule.canonical) else {
            continue;
        };
        let dimension = facet.dimension_source;
        debug_assert_eq!(
            dimension, rule.dimension,
            "mapping rule dimension must match its canonical's facet (validated at load time)"
        );

        let search_fields: Vec<String> = match &rule.source_fields {
            Some(f) => f.clone(),
            None => DEFAULT_SEARCH_FIELDS.iter().map(|s| s.to_string()).collect(),
        };

        let matched = search_fields
            .iter()
            .flat_map(|f| field_text(&entity.primitives, f))
            .any(|text| rule.pattern.is_match(text));

        if matched {
            entity.dimension_mut(dimension).push(rule.canonical.clone());
        }
    }
}

/// Step B.
fn stabilize_dimensions(entity: &mut ExtractedEntity) {
    for dim in CanonicalDimension::ALL {
        let values = entity.dimension_mut(dim);
        let mut seen = BTreeSet::new();
        values.retain(|v| seen.insert(v.clone()));
        values.sort();
    }
}

/// Step C.
fn active_modules(
    entity: &ExtractedEntity,
    lens: &LensContract,
    entity_class_hint: Option<EntityClass>,
) -> BTreeSet<String> {
    let hint_str = entity_class_hint.map(|c| c.to_string());
    let mut active = BTreeSet::new();
    for trigger in &lens.module_triggers {
        let Some(facet) = lens.facets.get(&trigger.facet) else {
            continue;
        };
        let present = entity.dimension(facet.dimension_source).iter().any(|v| *v == trigger.value);
        if !present {
            continue;
        }
        let conditions_ok = trigger
            .conditions
            .iter()
            .all(|c| c.matches(hint_str.as_deref()));
        if conditions_ok {
            active.extend(trigger.add_modules.iter().cloned());
        }
    }
    active
}

/// Step D.
fn run_module_field_rules(
    entity: &mut ExtractedEntity,
    lens: &LensContract,
    active_modules: &BTreeSet<String>,
    source_name: &str,
    entity_class_hint: Option<EntityClass>,
) {
    let hint_str = entity_class_hint.map(|c| c.to_string());
    for module_key in active_modules {
        let Some(module_def) = lens.modules.get(module_key) else {
            continue;
        };
        for rule in &module_def.field_rules {
            if !rule.applicability.matches_source(source_name) {
                continue;
            }
            if !rule.applicability.matches_entity_class(hint_str.as_deref()) {
                continue;
            }
            let Some(extracted) = run_field_extractor(rule, &entity.primitives) else {
                continue;
            };
            let value = apply_normalizers(extracted, &rule.normalizers).into_json();

            let target_path = format!("{module_key}.{}", rule.target_path);
            write_field(entity, &target_path, value, rule, source_name);
        }
    }
}

fn run_field_extractor(rule: &FieldRule, primitives: &Primitives) -> Option<Extracted> {
    let mut fields = rule.source_fields.iter();
    let text = fields.find_map(|f| {
        field_text(primitives, f)
            .into_iter()
            .find_map(|candidate| rule.pattern.captures(candidate))
            .map(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(0))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default()
            })
    })?;

    match rule.extractor {
        ExtractorKind::RegexCapture => Some(Extracted::Text(text)),
        ExtractorKind::NumericParser => text.trim().parse::<f64>().ok().map(Extracted::Number),
    }
}

/// Write to `modules[target_path]`, applying the scalar conflict rule
/// (§4.4) when a value is already present: higher `field_confidence` wins;
/// everything here is from a single source so a tie keeps the existing
/// (earlier-declared) value.
fn write_field(
    entity: &mut ExtractedEntity,
    target_path: &str,
    value: serde_json::Value,
    rule: &FieldRule,
    source_name: &str,
) {
    if let Some(existing_confidence) = entity.field_confidence.get(target_path).copied() {
        if existing_confidence >= rule.confidence {
            return;
        }
    }
    let (module_key, leaf_path) = target_path.split_once('.').unwrap_or((target_path, ""));
    let module_map = entity.modules.entry(module_key.to_string()).or_default();
    let write_path = if leaf_path.is_empty() {
        target_path.to_string()
    } else {
        leaf_path.to_string()
    };
    path::set_path(module_map, &write_path, value);
    entity.field_confidence.insert(target_path.to_string(), rule.confidence);
    entity.source_info.insert(target_path.to_string(), source_name.to_string());
}
