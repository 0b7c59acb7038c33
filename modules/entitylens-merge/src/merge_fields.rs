use std::cmp::Ordering;

use entitylens_common::{CanonicalDimension, ExtractedEntity};

/// Tie-break chain used whenever two sources disagree on a scalar or leaf
/// value: higher confidence wins, then higher source trust, then the
/// alphabetically-last source name (spec.md §4.9/§4.4). Total order, so
/// folding a group of entities through `merge_two` is commutative and
/// associative regardless of input order.
fn winner<'a>(
    a_confidence: f64,
    a_source: &'a str,
    a_trust: u8,
    b_confidence: f64,
    b_source: &'a str,
    b_trust: u8,
) -> Ordering {
    a_confidence
        .partial_cmp(&b_confidence)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a_trust.cmp(&b_trust))
        .then_with(|| a_source.cmp(b_source))
}

/// Merge `b` into `a`, returning the combined record. `trust_level` looks
/// up a source's registered trust level by name (0 for unknown sources).
pub fn merge_two(mut a: ExtractedEntity, b: ExtractedEntity, trust_level: &impl Fn(&str) -> u8) -> ExtractedEntity {
    for dim in CanonicalDimension::ALL {
        let merged: std::collections::BTreeSet<String> =
            a.dimension(dim).iter().cloned().chain(b.dimension(dim).iter().cloned()).collect();
        *a.dimension_mut(dim) = merged.into_iter().collect();
    }

    for (k, v) in &b.external_ids {
        a.external_ids.entry(k.clone()).or_insert_with(|| v.clone());
    }

    merge_modules(&mut a, &b, trust_level);
    merge_primitive_scalars(&mut a, &b, trust_level);

    if a.entity_class.is_none() {
        a.entity_class = b.entity_class;
    }

    a
}

fn merge_modules(a: &mut ExtractedEntity, b: &ExtractedEntity, trust_level: &impl Fn(&str) -> u8) {
    for (module_key, b_map) in &b.modules {
        let a_map = a.modules.entry(module_key.clone()).or_default();
        for (leaf_key, b_value) in b_map {
            let target_path = format!("{module_key}.{leaf_key}");
            let b_confidence = *b.field_confidence.get(&target_path).unwrap_or(&0.0);
            let b_source = b.source_info.get(&target_path).map(String::as_str).unwrap_or(&b.source_name);

            match a_map.get(leaf_key) {
                None => {
                    a_map.insert(leaf_key.clone(), b_value.clone());
                    a.field_confidence.insert(target_path.clone(), b_confidence);
                    a.source_info.insert(target_path, b_source.to_string());
                }
                Some(_existing) => {
                    let a_confidence = *a.field_confidence.get(&target_path).unwrap_or(&0.0);
                    let a_source = a
                        .source_info
                        .get(&target_path)
                        .cloned()
                        .unwrap_or_else(|| a.source_name.clone());
                    let cmp = winner(
                        a_confidence,
                        &a_source,
                        trust_level(&a_source),
                        b_confidence,
                        b_source,
                        trust_level(b_source),
                    );
                    if cmp == Ordering::Less {
                        a_map.insert(leaf_key.clone(), b_value.clone());
                        a.field_confidence.insert(target_path.clone(), b_confidence);
                        a.source_info.insert(target_path, b_source.to_string());
                    }
                }
            }
        }
    }
}

/// A primitive field's confidence, if the mapping step recorded one
/// (it usually doesn't — `field_confidence` is populated for module
/// target paths, not raw extraction output). Falls back to the entity's
/// aggregate confidence so the tie-break still has a quality signal to
/// compare instead of silently collapsing to "always equal".
fn primitive_confidence(e: &ExtractedEntity, field_name: &str) -> f64 {
    e.field_confidence
        .get(field_name)
        .copied()
        .unwrap_or_else(|| e.aggregate_confidence())
}

/// The source currently credited with a scalar field's value: the
/// provenance a prior merge recorded for this exact field, or the entity's
/// own source if the field has never been through a merge decision yet.
/// Tracking this per field (not `e.source_name`, which names only the
/// entity's original source and never changes across folds) is what keeps
/// a 3+-way fold associative — each comparison is against whichever source
/// actually won the field last, not whichever entity happened to be first.
fn field_source(e: &ExtractedEntity, field_name: &str) -> String {
    e.source_info.get(field_name).cloned().unwrap_or_else(|| e.source_name.clone())
}

/// Primitive scalar conflicts: only fields both sides actually populated
/// need a decision; an absent value never overrides a present one.
fn merge_primitive_scalars(a: &mut ExtractedEntity, b: &ExtractedEntity, trust_level: &impl Fn(&str) -> u8) {
    macro_rules! merge_scalar {
        ($field:ident) => {{
            let field_name = stringify!($field);
            if a.primitives.$field.is_none() {
                if b.primitives.$field.is_some() {
                    let b_confidence = primitive_confidence(b, field_name);
                    let b_source = field_source(b, field_name);
                    a.primitives.$field = b.primitives.$field.clone();
                    a.field_confidence.insert(field_name.to_string(), b_confidence);
                    a.source_info.insert(field_name.to_string(), b_source);
                }
            } else if b.primitives.$field.is_some() {
                let a_confidence = primitive_confidence(a, field_name);
                let a_source = field_source(a, field_name);
                let b_confidence = primitive_confidence(b, field_name);
                let b_source = field_source(b, field_name);
                let cmp = winner(
                    a_confidence,
                    &a_source,
                    trust_level(&a_source),
                    b_confidence,
                    &b_source,
                    trust_level(&b_source),
                );
                if cmp == Ordering::Less {
                    a.primitives.$field = b.primitives.$field.clone();
                    a.field_confidence.insert(field_name.to_string(), b_confidence);
                    a.source_info.insert(field_name.to_string(), b_source);
                }
            }
        }};
    }

    merge_scalar!(entity_name);
    merge_scalar!(given_name);
    merge_scalar!(family_name);
    merge_scalar!(organization_name);
    merge_scalar!(description);
    merge_scalar!(summary);
    merge_scalar!(street_address);
    merge_scalar!(city);
    merge_scalar!(postcode);
    merge_scalar!(latitude);
    merge_scalar!(longitude);
    merge_scalar!(phone);
    merge_scalar!(email);
    merge_scalar!(website_url);
    merge_scalar!(time_range_start);
    merge_scalar!(time_range_end);

    for cat in &b.primitives.raw_categories {
        if !a.primitives.raw_categories.contains(cat) {
            a.primitives.raw_categories.push(cat.clone());
        }
    }
    a.primitives.raw_categories.sort();
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_common::Primitives;

    fn entity(name: &str, source: &str, confidence: f64) -> ExtractedEntity {
        let mut e = ExtractedEntity::new(
            Primitives {
                entity_name: Some(name.to_string()),
                ..Default::default()
            },
            source,
        );
        e.field_confidence.insert("entity_name".to_string(), confidence);
        e
    }

    fn no_trust(_: &str) -> u8 {
        0
    }

    #[test]
    fn dimension_union_is_deduplicated_and_sorted() {
        let mut a = entity("A", "src_a", 0.5);
        let mut b = entity("B", "src_b", 0.5);
        *a.dimension_mut(CanonicalDimension::Activities) = vec!["zeta".to_string(), "alpha".to_string()];
        *b.dimension_mut(CanonicalDimension::Activities) = vec!["alpha".to_string(), "beta".to_string()];
        let merged = merge_two(a, b, &no_trust);
        assert_eq!(
            merged.dimension(CanonicalDimension::Activities),
            &["alpha".to_string(), "beta".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn higher_confidence_source_wins_scalar_conflict() {
        let a = entity("Riverside Cafe", "low_trust_source", 0.2);
        let b = entity("Riverside Coffee House", "high_conf_source", 0.9);
        let merged = merge_two(a, b, &no_trust);
        assert_eq!(merged.primitives.entity_name.as_deref(), Some("Riverside Coffee House"));
    }

    #[test]
    fn merge_is_commutative_for_scalar_fields() {
        let a = entity("Riverside Cafe", "a", 0.9);
        let b = entity("Riverside Coffee House", "b", 0.2);
        let merged_ab = merge_two(a.clone(), b.clone(), &no_trust);
        let merged_ba = merge_two(b, a, &no_trust);
        assert_eq!(merged_ab.primitives.entity_name, merged_ba.primitives.entity_name);
    }

    fn entity_with_fields(source: &str, phone: Option<&str>, latitude: Option<f64>) -> ExtractedEntity {
        ExtractedEntity::new(
            Primitives {
                phone: phone.map(str::to_string),
                latitude,
                ..Default::default()
            },
            source,
        )
    }

    #[test]
    fn scalar_merge_records_source_info_per_field() {
        let s1 = entity_with_fields("S1", Some("555-0100"), None);
        let s2 = entity_with_fields("S2", None, Some(40.0));
        let merged = merge_two(s1, s2, &no_trust);
        assert_eq!(merged.source_info.get("phone").map(String::as_str), Some("S1"));
        assert_eq!(merged.source_info.get("latitude").map(String::as_str), Some("S2"));
    }

    fn trust_by_name(name: &str) -> u8 {
        match name {
            "s1" => 10,
            "s2" => 90,
            "s3" => 50,
            _ => 0,
        }
    }

    #[test]
    fn three_way_scalar_merge_is_order_independent_and_tracks_true_winner() {
        let s1 = entity_with_fields("s1", Some("111-1111"), None);
        let s2 = entity_with_fields("s2", Some("222-2222"), None);
        let s3 = entity_with_fields("s3", Some("333-3333"), None);

        // s2 has the highest trust level and must win regardless of fold
        // order (invariant 6: merge(E) == merge(E') for any permutation E').
        let folded_123 = merge_two(merge_two(s1.clone(), s2.clone(), &trust_by_name), s3.clone(), &trust_by_name);
        let folded_321 = merge_two(merge_two(s3, s2, &trust_by_name), s1, &trust_by_name);

        assert_eq!(folded_123.primitives.phone.as_deref(), Some("222-2222"));
        assert_eq!(folded_321.primitives.phone.as_deref(), Some("222-2222"));
        assert_eq!(folded_123.source_info.get("phone").map(String::as_str), Some("s2"));
    }
}
