use std::collections::BTreeSet;

/// Similarity is intentionally a fixed, documented algorithmic metric
/// (normalized token set ratio / Jaccard index over casefolded,
/// whitespace-collapsed name tokens) rather than anything learned, so
/// merge decisions stay reproducible across runs (spec.md §4.9).
pub fn name_similarity(a: &str, b: &str) -> f64 {
    let ta = tokenize(a);
    let tb = tokenize(b);
    if ta.is_empty() && tb.is_empty() {
        return 1.0;
    }
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let intersection = ta.intersection(&tb).count();
    let union = ta.union(&tb).count();
    intersection as f64 / union as f64
}

fn tokenize(s: &str) -> BTreeSet<String> {
    s.to_lowercase()
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Great-circle distance in meters between two coordinates.
pub fn haversine_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;
    let (lat1_rad, lat2_rad) = (lat1.to_radians(), lat2.to_radians());
    let d_lat = lat2_rad - lat1_rad;
    let d_lng = lng2.to_radians() - lng1.to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1_rad.cos() * lat2_rad.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_names_have_similarity_one() {
        assert_eq!(name_similarity("Riverside Cafe", "riverside cafe"), 1.0);
    }

    #[test]
    fn disjoint_names_have_similarity_zero() {
        assert_eq!(name_similarity("Riverside Cafe", "Acme Hardware"), 0.0);
    }

    #[test]
    fn partial_overlap_is_between_zero_and_one() {
        let s = name_similarity("Riverside Coffee House", "Riverside Coffee Bar");
        assert!(s > 0.0 && s < 1.0);
    }

    #[test]
    fn same_point_has_zero_distance() {
        assert_eq!(haversine_meters(51.5, -0.1, 51.5, -0.1), 0.0);
    }

    #[test]
    fn known_distance_is_approximately_correct() {
        // London to Paris, roughly 344 km great-circle.
        let d = haversine_meters(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((300_000.0..400_000.0).contains(&d), "got {d}");
    }
}
