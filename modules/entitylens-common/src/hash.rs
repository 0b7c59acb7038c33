use sha2::{Digest, Sha256};

/// SHA-256 over a canonically-serialized document: keys sorted, arrays
/// preserved in source order. Used for `LensContract::content_hash` so that
/// two lens documents with the same meaning but different key ordering hash
/// identically, while array ordering (which is semantically load-bearing —
/// rule declaration order) is never reordered.
pub fn canonical_json_hash(value: &serde_json::Value) -> String {
    let canonical = canonicalize(value);
    content_hash_hex(&canonical.to_string())
}

/// SHA-256 of raw bytes, hex-encoded. Used for `RawPayload::hash` and other
/// plain content-addressing needs that don't need JSON canonicalization.
pub fn content_hash_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

fn canonicalize(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = serde_json::Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), canonicalize(v));
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.iter().map(canonicalize).collect())
        }
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn key_order_does_not_affect_hash() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(canonical_json_hash(&a), canonical_json_hash(&b));
    }

    #[test]
    fn array_order_does_affect_hash() {
        let a = json!({"rules": [1, 2]});
        let b = json!({"rules": [2, 1]});
        assert_ne!(canonical_json_hash(&a), canonical_json_hash(&b));
    }
}
