pub mod classify;

pub use classify::classify;

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_common::{EntityClass, Primitives};

    #[test]
    fn geography_and_name_classifies_as_place() {
        let p = Primitives {
            entity_name: Some("Riverside Cafe".to_string()),
            latitude: Some(51.5),
            longitude: Some(-0.1),
            ..Default::default()
        };
        assert_eq!(classify(&p), EntityClass::Place);
    }

    #[test]
    fn person_name_without_geography_classifies_as_person() {
        let p = Primitives {
            given_name: Some("Ada".to_string()),
            family_name: Some("Lovelace".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&p), EntityClass::Person);
    }

    #[test]
    fn organization_name_without_person_or_coordinates_classifies_as_organization() {
        let p = Primitives {
            organization_name: Some("Acme Co".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&p), EntityClass::Organization);
    }

    #[test]
    fn time_range_without_other_structure_classifies_as_event() {
        let p = Primitives {
            time_range_start: Some(chrono::Utc::now()),
            ..Default::default()
        };
        assert_eq!(classify(&p), EntityClass::Event);
    }

    #[test]
    fn bare_primitives_classify_as_thing() {
        let p = Primitives::default();
        assert_eq!(classify(&p), EntityClass::Thing);
    }

    #[test]
    fn geography_without_a_name_does_not_classify_as_place() {
        let p = Primitives {
            street_address: Some("221B Baker St".to_string()),
            ..Default::default()
        };
        assert_ne!(classify(&p), EntityClass::Place);
    }

    #[test]
    fn source_contains_no_lens_vocabulary_terms() {
        let source = include_str!("classify.rs");
        let lens_terms = ["coffee", "espresso", "cafe", "sports", "restaurant"];
        for term in lens_terms {
            assert!(
                !source.to_lowercase().contains(term),
                "classifier source must not reference lens-declared vocabulary like '{term}'"
            );
        }
    }
}
