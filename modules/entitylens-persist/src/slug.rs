use entitylens_common::ExtractedEntity;

/// Deterministic, URL-safe slug derived from `entity_name` plus a locality
/// hint (city, falling back to postcode, falling back to "global"). This is
/// the unique key rows are upserted by (spec.md §4.10/§9 "Slug").
pub fn derive_slug(entity: &ExtractedEntity) -> String {
    let name = entity.primitives.entity_name.as_deref().unwrap_or("unnamed");
    let locality = entity
        .primitives
        .city
        .as_deref()
        .or(entity.primitives.postcode.as_deref())
        .unwrap_or("global");
    slugify(&format!("{name}-{locality}"))
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

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_common::Primitives;

    fn entity(name: &str) -> ExtractedEntity {
        ExtractedEntity::new(
            Primitives {
                entity_name: Some(name.to_string()),
                ..Default::default()
            },
            "osm",
        )
    }

    #[test]
    fn slug_combines_name_and_city() {
        let mut e = entity("Riverside Cafe");
        e.primitives.city = Some("Springfield".to_string());
        assert_eq!(derive_slug(&e), "riverside-cafe-springfield");
    }

    #[test]
    fn slug_is_stable_across_repeated_derivation() {
        let mut e = entity("Riverside Cafe");
        e.primitives.city = Some("Springfield".to_string());
        assert_eq!(derive_slug(&e), derive_slug(&e));
    }

    #[test]
    fn slug_falls_back_to_postcode_then_global() {
        let mut e = entity("Acme Hardware");
        e.primitives.postcode = Some("12345".to_string());
        assert_eq!(derive_slug(&e), "acme-hardware-12345");

        let e2 = entity("Acme Hardware");
        assert_eq!(derive_slug(&e2), "acme-hardware-global");
    }
}
