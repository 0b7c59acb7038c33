pub mod engine;
pub mod fields;
pub mod normalize;
pub mod path;

pub use engine::map;

#[cfg(test)]
mod tests {
    use super::*;
    use entitylens_common::{CanonicalDimension, EntityClass, Primitives};
    use entitylens_connector::ConnectorRegistry;
    use entitylens_loader::load_lens;

    const LENS: &str = r#"
schema:
  version: "1.0"
facets:
  activity:
    dimension_source: activities
    ui_label: "Activities"
  role:
    dimension_source: roles
    ui_label: "Roles"
values:
  - key: coffee
    facet: activity
    display_name: "Coffee"
    seo_slug: coffee
    search_keywords: ["coffee", "espresso"]
  - key: cafe_role
    facet: role
    display_name: "Cafe"
    seo_slug: cafe
    search_keywords: ["cafe"]
mapping_rules:
  - id: r_coffee
    pattern: "(?i)coffee|espresso"
    canonical: coffee
    dimension: activities
    confidence: 0.9
  - id: r_cafe
    pattern: "(?i)cafe"
    canonical: cafe_role
    dimension: roles
    confidence: 0.8
modules:
  amenities:
    description: "Amenity details"
    field_rules:
      - rule_id: fr_seats
        target_path: seat_count
        extractor: numeric_parser
        pattern: "(\\d+)\\s*seats"
        source_fields: ["description"]
        confidence: 0.7
        normalizers: ["round_integer"]
      - rule_id: fr_hours
        target_path: hours.note
        extractor: regex_capture
        pattern: "open\\s+(.+)"
        source_fields: ["description"]
        confidence: 0.6
        normalizers: ["trim", "lowercase"]
module_triggers:
  - when:
      facet: activity
      value: coffee
    add_modules: ["amenities"]
"#;

    fn lens() -> entitylens_loader::LensContract {
        let registry = ConnectorRegistry::new();
        load_lens("t", LENS, &registry).unwrap()
    }

    fn primitives(description: &str) -> Primitives {
        Primitives {
            entity_name: Some("Riverside Coffee".to_string()),
            description: Some(description.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn dimensions_are_deduplicated_and_sorted() {
        let l = lens();
        let p = primitives("A cozy cafe serving coffee and espresso, 42 seats, open Tue-Sun");
        let entity = map(p, &l, "demo", None);
        assert_eq!(entity.dimension(CanonicalDimension::Activities), &["coffee"]);
        assert_eq!(entity.dimension(CanonicalDimension::Roles), &["cafe_role"]);
    }

    #[test]
    fn module_trigger_activates_and_field_rules_populate_module() {
        let l = lens();
        let p = primitives("A cozy cafe serving coffee, 42 seats, open Tue-Sun 8am-5pm");
        let entity = map(p, &l, "demo", None);
        let amenities = entity.modules.get("amenities").expect("amenities module active");
        assert_eq!(amenities.get("seat_count"), Some(&serde_json::json!(42.0)));
        let hours = amenities.get("hours").and_then(|v| v.get("note"));
        assert_eq!(hours, Some(&serde_json::json!("tue-sun 8am-5pm")));
    }

    #[test]
    fn module_does_not_activate_without_its_trigger_value() {
        let l = lens();
        let p = primitives("A quiet bookstore, no coffee here");
        let entity = map(p, &l, "demo", None);
        assert!(entity.modules.get("amenities").is_none());
    }

    #[test]
    fn mapping_is_deterministic_for_identical_inputs() {
        let l = lens();
        let p1 = primitives("A cozy cafe serving coffee and espresso, 42 seats, open Tue-Sun");
        let p2 = primitives("A cozy cafe serving coffee and espresso, 42 seats, open Tue-Sun");
        let e1 = map(p1, &l, "demo", None);
        let e2 = map(p2, &l, "demo", None);
        assert_eq!(
            serde_json::to_string(&e1).unwrap(),
            serde_json::to_string(&e2).unwrap()
        );
    }

    #[test]
    fn entity_class_hint_gates_module_triggers_with_conditions() {
        // no conditions declared on this trigger, so the hint shouldn't matter
        let l = lens();
        let p = primitives("coffee house");
        let with_hint = map(p.clone(), &l, "demo", Some(EntityClass::Place));
        let without_hint = map(p, &l, "demo", None);
        assert_eq!(with_hint.modules.contains_key("amenities"), without_hint.modules.contains_key("amenities"));
    }
}
