use entitylens_common::Primitives;

/// Fields searched by a mapping rule when it doesn't declare its own
/// `source_fields` (spec.md §4.7 Step A).
pub const DEFAULT_SEARCH_FIELDS: &[&str] =
    &["entity_name", "description", "raw_categories", "summary", "street_address"];

/// Text candidates for a named primitive field. `raw_categories` yields one
/// candidate per element; every other field yields at most one.
pub fn field_text<'a>(primitives: &'a Primitives, field: &str) -> Vec<&'a str> {
    match field {
        "entity_name" => primitives.entity_name.as_deref().into_iter().collect(),
        "given_name" => primitives.given_name.as_deref().into_iter().collect(),
        "family_name" => primitives.family_name.as_deref().into_iter().collect(),
        "organization_name" => primitives.organization_name.as_deref().into_iter().collect(),
        "description" => primitives.description.as_deref().into_iter().collect(),
        "summary" => primitives.summary.as_deref().into_iter().collect(),
        "raw_categories" => primitives.raw_categories.iter().map(String::as_str).collect(),
        "street_address" => primitives.street_address.as_deref().into_iter().collect(),
        "city" => primitives.city.as_deref().into_iter().collect(),
        "postcode" => primitives.postcode.as_deref().into_iter().collect(),
        "phone" => primitives.phone.as_deref().into_iter().collect(),
        "email" => primitives.email.as_deref().into_iter().collect(),
        "website_url" => primitives.website_url.as_deref().into_iter().collect(),
        _ => Vec::new(),
    }
}
