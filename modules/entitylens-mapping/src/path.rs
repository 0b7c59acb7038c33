use entitylens_common::ModuleMap;

/// Write `value` into `map` at a dot-notation `path`, creating nested
/// objects as needed (spec.md §4.7 Step D).
pub fn set_path(map: &mut ModuleMap, path: &str, value: serde_json::Value) {
    let mut parts = path.split('.');
    let Some(first) = parts.next() else { return };
    let rest: Vec<&str> = parts.collect();

    if rest.is_empty() {
        map.insert(first.to_string(), value);
        return;
    }

    let entry = map
        .entry(first.to_string())
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    set_nested(entry, &rest, value);
}

fn set_nested(node: &mut serde_json::Value, path: &[&str], value: serde_json::Value) {
    if !node.is_object() {
        *node = serde_json::Value::Object(serde_json::Map::new());
    }
    let obj = node.as_object_mut().expect("just coerced to object");

    match path {
        [] => unreachable!("empty path handled by caller"),
        [leaf] => {
            obj.insert((*leaf).to_string(), value);
        }
        [head, tail @ ..] => {
            let entry = obj
                .entry((*head).to_string())
                .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
            set_nested(entry, tail, value);
        }
    }
}

/// Read the value currently at `path`, if any — used for scalar conflict
/// resolution when two field rules target the same nested location.
pub fn get_path<'a>(map: &'a ModuleMap, path: &str) -> Option<&'a serde_json::Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = map.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_flat_path() {
        let mut map = ModuleMap::new();
        set_path(&mut map, "capacity", serde_json::json!(42));
        assert_eq!(get_path(&map, "capacity"), Some(&serde_json::json!(42)));
    }

    #[test]
    fn writes_and_reads_nested_path() {
        let mut map = ModuleMap::new();
        set_path(&mut map, "hours.monday.open", serde_json::json!("09:00"));
        assert_eq!(get_path(&map, "hours.monday.open"), Some(&serde_json::json!("09:00")));
    }

    #[test]
    fn sibling_nested_paths_do_not_clobber_each_other() {
        let mut map = ModuleMap::new();
        set_path(&mut map, "hours.monday.open", serde_json::json!("09:00"));
        set_path(&mut map, "hours.monday.close", serde_json::json!("17:00"));
        assert_eq!(get_path(&map, "hours.monday.open"), Some(&serde_json::json!("09:00")));
        assert_eq!(get_path(&map, "hours.monday.close"), Some(&serde_json::json!("17:00")));
    }
}
