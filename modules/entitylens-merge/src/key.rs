use entitylens_common::ExtractedEntity;

use crate::similarity::{haversine_meters, name_similarity};

/// Default thresholds from spec.md §4.9. Similarity below `AMBIGUOUS_SIM_FLOOR`
/// or distance beyond `AMBIGUOUS_DIST_CEILING` is a clean non-match.
pub const SIM_THRESHOLD: f64 = 0.85;
pub const DIST_THRESHOLD_M: f64 = 500.0;
pub const AMBIGUOUS_SIM_FLOOR: f64 = 0.70;
pub const AMBIGUOUS_DIST_CEILING_M: f64 = 2.0 * DIST_THRESHOLD_M;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Same,
    Ambiguous,
    Distinct,
}

/// Canonical key derivation, first-available of: matching external ID,
/// then name+locality slug, then fuzzy name/location match.
pub fn match_kind(a: &ExtractedEntity, b: &ExtractedEntity) -> MatchKind {
    if external_ids_match(a, b) {
        return MatchKind::Same;
    }
    if let (Some(sa), Some(sb)) = (locality_slug(a), locality_slug(b)) {
        if sa == sb {
            return MatchKind::Same;
        }
    }
    fuzzy_match_kind(a, b)
}

fn external_ids_match(a: &ExtractedEntity, b: &ExtractedEntity) -> bool {
    a.external_ids
        .iter()
        .any(|(k, v)| b.external_ids.get(k).is_some_and(|bv| bv == v))
}

/// A coarse, deterministic slug combining entity name and locality hint
/// (city, falling back to postcode). Used as a cheap structural match
/// before falling back to fuzzy matching.
fn locality_slug(e: &ExtractedEntity) -> Option<String> {
    let name = e.primitives.entity_name.as_ref()?;
    let locality = e.primitives.city.as_deref().or(e.primitives.postcode.as_deref())?;
    Some(slugify(&format!("{name}-{locality}")))
}

fn slugify(s: &str) -> String {
    let mut out = String::new();
    let mut last_was_dash = false;
    for c in s.to_lowercase().chars() {
        if c.is_alphanumeric() {
            out.push(c);
            last_was_dash = false;
        } else if !last_was_dash {
            out.push('-');
            last_was_dash = true;
        }
    }
    out.trim_matches('-').to_string()
}

fn fuzzy_match_kind(a: &ExtractedEntity, b: &ExtractedEntity) -> MatchKind {
    let (Some(name_a), Some(name_b)) = (&a.primitives.entity_name, &b.primitives.entity_name) else {
        return MatchKind::Distinct;
    };
    let sim = name_similarity(name_a, name_b);

    let distance = match (
        a.primitives.latitude,
        a.primitives.longitude,
        b.primitives.latitude,
        b.primitives.longitude,
    ) {
        (Some(lat1), Some(lng1), Some(lat2), Some(lng2)) => Some(haversine_meters(lat1, lng1, lat2, lng2)),
        _ => None,
    };

    let proximate = match distance {
        Some(d) => d <= DIST_THRESHOLD_M,
        None => true,
    };
    let ambiguous_proximity = distance.is_some_and(|d| d > DIST_THRESHOLD_M && d <= AMBIGUOUS_DIST_CEILING_M);

    if sim >= SIM_THRESHOLD && proximate {
        return MatchKind::Same;
    }
    if (sim >= AMBIGUOUS_SIM_FLOOR && sim < SIM_THRESHOLD) || ambiguous_proximity {
        return MatchKind::Ambiguous;
    }
    MatchKind::Distinct
}
