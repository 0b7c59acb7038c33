/// Intermediate representation of a field rule's raw extraction, before
/// normalizers and before it becomes a `serde_json::Value` leaf.
#[derive(Debug, Clone)]
pub enum Extracted {
    Text(String),
    Number(f64),
}

impl Extracted {
    pub fn into_json(self) -> serde_json::Value {
        match self {
            Extracted::Text(s) => serde_json::Value::String(s),
            Extracted::Number(n) => serde_json::Number::from_f64(n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
        }
    }
}

/// Apply normalizers left-to-right (spec.md §4.7 Step D). Unknown
/// normalizer names are ignored rather than treated as fatal — a lens can
/// name a normalizer this build doesn't implement and degrade gracefully.
pub fn apply_normalizers(mut value: Extracted, normalizers: &[String]) -> Extracted {
    for name in normalizers {
        value = match (name.as_str(), value) {
            ("trim", Extracted::Text(s)) => Extracted::Text(s.trim().to_string()),
            ("lowercase", Extracted::Text(s)) => Extracted::Text(s.to_lowercase()),
            ("round_integer", Extracted::Number(n)) => Extracted::Number(n.round()),
            ("round_integer", Extracted::Text(s)) => match s.trim().parse::<f64>() {
                Ok(n) => Extracted::Number(n.round()),
                Err(_) => Extracted::Text(s),
            },
            (_, other) => other,
        };
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_then_lowercase_applies_in_order() {
        let v = apply_normalizers(
            Extracted::Text("  Open Late  ".to_string()),
            &["trim".to_string(), "lowercase".to_string()],
        );
        match v {
            Extracted::Text(s) => assert_eq!(s, "open late"),
            _ => panic!("expected text"),
        }
    }

    #[test]
    fn round_integer_on_text_parses_then_rounds() {
        let v = apply_normalizers(Extracted::Text("41.6".to_string()), &["round_integer".to_string()]);
        match v {
            Extracted::Number(n) => assert_eq!(n, 42.0),
            _ => panic!("expected number"),
        }
    }
}
