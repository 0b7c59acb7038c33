pub mod conflict;
pub mod key;
pub mod merge_fields;
pub mod similarity;

pub use conflict::MergeConflict;
pub use key::{MatchKind, AMBIGUOUS_DIST_CEILING_M, AMBIGUOUS_SIM_FLOOR, DIST_THRESHOLD_M, SIM_THRESHOLD};
pub use merge_fields::merge_two;

use entitylens_common::ExtractedEntity;

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            // Lower index as root keeps grouping deterministic and
            // independent of union call order.
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

pub struct MergeOutput {
    pub merged: Vec<ExtractedEntity>,
    pub conflicts: Vec<MergeConflict>,
}

/// Cross-source dedup and merge (C9). Builds the match graph over every
/// candidate pair, unions `Same` pairs via union-find (order-independent),
/// records `Ambiguous` pairs as conflicts without merging them, then folds
/// each group through `merge_two` — a reduction that is commutative and
/// associative given the tie-break chain in `merge_fields`, so the result
/// does not depend on input order (spec.md §4.9 determinism property).
pub fn dedup_and_merge(candidates: Vec<ExtractedEntity>, trust_level: impl Fn(&str) -> u8) -> MergeOutput {
    let n = candidates.len();
    let mut uf = UnionFind::new(n);
    let mut conflicts = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match key::match_kind(&candidates[i], &candidates[j]) {
                MatchKind::Same => uf.union(i, j),
                MatchKind::Ambiguous => conflicts.push(MergeConflict {
                    candidate_a: candidates[i].clone(),
                    candidate_b: candidates[j].clone(),
                    reason: "similarity or proximity in the ambiguous band".to_string(),
                }),
                MatchKind::Distinct => {}
            }
        }
    }

    if !conflicts.is_empty() {
        tracing::debug!(count = conflicts.len(), "merge produced ambiguous candidate pairs");
    }

    let mut groups: std::collections::BTreeMap<usize, Vec<usize>> = std::collections::BTreeMap::new();
    for i in 0..n {
        let root = uf.find(i);
        groups.entry(root).or_default().push(i);
    }

    let mut candidates: Vec<Option<ExtractedEntity>> = candidates.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(groups.len());
    for (_, members) in groups {
        let mut iter = members.into_iter();
        let first = iter.next().expect("group always has at least one member");
        let mut acc = candidates[first].take().expect("not yet consumed");
        for idx in iter {
            let next = candidates[idx].take().expect("not yet consumed");
            acc = merge_two(acc, next, &trust_level);
        }
        merged.push(acc);
    }
    merged.sort_by(|a, b| a.primitives.entity_name.cmp(&b.primitives.entity_name));

    MergeOutput { merged, conflicts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_common::Primitives;

    fn entity(name: &str, source: &str) -> ExtractedEntity {
        ExtractedEntity::new(
            Primitives {
                entity_name: Some(name.to_string()),
                ..Default::default()
            },
            source,
        )
    }

    fn no_trust(_: &str) -> u8 {
        0
    }

    #[test]
    fn distinct_entities_stay_separate() {
        let candidates = vec![entity("Riverside Cafe", "a"), entity("Acme Hardware", "b")];
        let out = dedup_and_merge(candidates, no_trust);
        assert_eq!(out.merged.len(), 2);
        assert!(out.conflicts.is_empty());
    }

    #[test]
    fn shared_external_id_merges_into_one() {
        let mut a = entity("Riverside Cafe", "osm");
        let mut b = entity("Riverside Coffee House", "yelp");
        a.external_ids.insert("osm".to_string(), "node/123".to_string());
        b.external_ids.insert("osm".to_string(), "node/123".to_string());
        let out = dedup_and_merge(vec![a, b], no_trust);
        assert_eq!(out.merged.len(), 1);
        assert!(out.conflicts.is_empty());
    }

    #[test]
    fn transitive_matches_collapse_into_a_single_group() {
        // a<->b via external id, b<->c via external id, a and c share no
        // direct id of their own but must still land in the same group.
        let mut a = entity("A", "s1");
        let mut b = entity("B", "s2");
        let mut c = entity("C", "s3");
        a.external_ids.insert("x".to_string(), "1".to_string());
        b.external_ids.insert("x".to_string(), "1".to_string());
        b.external_ids.insert("y".to_string(), "2".to_string());
        c.external_ids.insert("y".to_string(), "2".to_string());
        let out = dedup_and_merge(vec![a, b, c], no_trust);
        assert_eq!(out.merged.len(), 1);
    }

    #[test]
    fn merge_result_is_independent_of_input_order() {
        let mut a = entity("Riverside Cafe", "osm");
        let mut b = entity("Riverside Coffee House", "yelp");
        a.external_ids.insert("osm".to_string(), "node/123".to_string());
        b.external_ids.insert("osm".to_string(), "node/123".to_string());
        let c = entity("Acme Hardware", "other");

        let forward = dedup_and_merge(vec![a.clone(), b.clone(), c.clone()], no_trust);
        let reversed = dedup_and_merge(vec![c, b, a], no_trust);

        let names_forward: Vec<_> = forward.merged.iter().map(|e| e.primitives.entity_name.clone()).collect();
        let names_reversed: Vec<_> = reversed.merged.iter().map(|e| e.primitives.entity_name.clone()).collect();
        assert_eq!(names_forward, names_reversed);
    }
}
