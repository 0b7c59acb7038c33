use entitylens_common::Primitives;
use regex::Regex;
use std::sync::OnceLock;

fn e164_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\+[1-9]\d{1,14}$").unwrap())
}

fn postcode_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Generic alphanumeric postcode shape (UK/US/CA-ish); lenses do not
    // extend this — postcode format is a structural primitive, not a
    // domain concept.
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 -]{2,9}[A-Za-z0-9]$").unwrap())
}

/// Normalize phone to E.164, validate postcode shape, validate coordinate
/// ranges. Invalid values are nulled, never inferred (spec.md §4.6).
pub fn validate(mut primitives: Primitives) -> Primitives {
    primitives.phone = primitives.phone.and_then(|p| normalize_phone(&p));
    primitives.postcode = primitives
        .postcode
        .and_then(|p| postcode_re().is_match(p.trim()).then(|| p.trim().to_string()));
    if let Some(lat) = primitives.latitude {
        if !(-90.0..=90.0).contains(&lat) {
            primitives.latitude = None;
        }
    }
    if let Some(lng) = primitives.longitude {
        if !(-180.0..=180.0).contains(&lng) {
            primitives.longitude = None;
        }
    }
    // Coordinates only make sense as a pair.
    if primitives.latitude.is_none() {
        primitives.longitude = None;
    }
    if primitives.longitude.is_none() {
        primitives.latitude = None;
    }
    primitives
}

fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let candidate = if raw.trim_start().starts_with('+') {
        format!("+{digits}")
    } else if digits.len() == 10 {
        format!("+1{digits}") // bare 10-digit number: assume NANP, like most ingestion pipelines do
    } else {
        format!("+{digits}")
    };
    e164_re().is_match(&candidate).then_some(candidate)
}
