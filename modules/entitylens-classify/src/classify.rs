use entitylens_common::{EntityClass, Primitives};

/// Assigns `entity_class` purely from the presence of structural
/// primitives — no domain vocabulary is ever consulted here (spec.md
/// §4.8). Rule template, evaluated in order; first match wins:
///
/// 1. geography (coordinates or street address) + a name -> place
/// 2. person-name structure, no geography -> person
/// 3. organization-name structure, no person name, no coordinates -> organization
/// 4. a time range -> event
/// 5. otherwise -> thing
pub fn classify(primitives: &Primitives) -> EntityClass {
    if primitives.has_geography() && primitives.has_name() {
        return EntityClass::Place;
    }
    if primitives.has_person_name() && !primitives.has_geography() {
        return EntityClass::Person;
    }
    if primitives.has_organization_name()
        && !primitives.has_person_name()
        && primitives.latitude.is_none()
        && primitives.longitude.is_none()
    {
        return EntityClass::Organization;
    }
    if primitives.has_time_range() {
        return EntityClass::Event;
    }
    EntityClass::Thing
}
