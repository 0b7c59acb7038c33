use entitylens_common::{IngestRequest, QueryFeatures};
use entitylens_loader::LensContract;

/// Tokens that, taken together, suggest the query is about a place rather
/// than a general topic — kept deliberately small and generic; lenses
/// supply their own vocabulary for anything domain-specific via
/// `vocabulary`/`search_keywords`.
const GEOGRAPHIC_MARKERS: &[&str] = &["near", "in", "at", "around", "nearby"];

/// Derive `QueryFeatures` from the free-text query and the active lens.
/// Pure function — no IO, matching spec.md §4.3 ("Planning is pure").
pub fn derive_features(request: &IngestRequest, lens: &LensContract) -> QueryFeatures {
    let normalized_query = normalize(&request.query);
    let tokens: Vec<&str> = normalized_query.split_whitespace().collect();

    let detected_keywords = detect_keywords(&tokens, lens);
    let geographic_hints = detect_geographic_hints(&tokens);
    let looks_like_category_search = looks_like_category_search(&tokens, lens);
    let is_sports_like = is_sports_like(&detected_keywords, lens);

    QueryFeatures {
        normalized_query,
        detected_keywords,
        geographic_hints,
        looks_like_category_search,
        is_sports_like,
    }
}

fn normalize(query: &str) -> String {
    query
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Intersection of query tokens with the lens's declared vocabulary:
/// `values[].search_keywords` and the free-standing `vocabulary` list.
fn detect_keywords(tokens: &[&str], lens: &LensContract) -> Vec<String> {
    let mut vocab: std::collections::BTreeSet<String> = lens.vocabulary.iter().cloned().collect();
    for v in &lens.values {
        for kw in &v.search_keywords {
            vocab.insert(kw.to_lowercase());
        }
        vocab.insert(v.display_name.to_lowercase());
    }
    tokens
        .iter()
        .map(|t| t.to_string())
        .filter(|t| vocab.contains(t))
        .collect()
}

fn detect_geographic_hints(tokens: &[&str]) -> Vec<String> {
    let mut hints = Vec::new();
    for (i, tok) in tokens.iter().enumerate() {
        if GEOGRAPHIC_MARKERS.contains(tok) {
            if let Some(next) = tokens.get(i + 1) {
                hints.push((*next).to_string());
            }
        }
    }
    hints
}

/// Structural heuristic: the query consists entirely of tokens that match
/// lens category/value display names (not a request for a specific named
/// entity). Never hard-codes a domain term.
fn looks_like_category_search(tokens: &[&str], lens: &LensContract) -> bool {
    if tokens.is_empty() {
        return false;
    }
    let category_tokens: std::collections::BTreeSet<String> = lens
        .values
        .iter()
        .flat_map(|v| v.display_name.to_lowercase().split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .collect();
    tokens.iter().all(|t| category_tokens.contains(*t))
}

/// "Sports-like" is a structural property driven by lens vocabulary: true
/// when every detected keyword belongs to a facet whose `ui_label`
/// mentions "sport" (case-insensitive) — there is no hard-coded sports
/// term anywhere in the engine.
fn is_sports_like(detected_keywords: &[String], lens: &LensContract) -> bool {
    if detected_keywords.is_empty() {
        return false;
    }
    detected_keywords.iter().all(|kw| {
        lens.values.iter().any(|v| {
            v.search_keywords.iter().any(|k| k.to_lowercase() == *kw)
                && lens
                    .facets
                    .get(&v.facet)
                    .map(|f| f.ui_label.to_lowercase().contains("sport"))
                    .unwrap_or(false)
        })
    })
}
