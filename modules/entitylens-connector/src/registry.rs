use std::collections::BTreeMap;

use crate::spec::ConnectorSpec;

/// Registry of known connectors, keyed by name. Consulted by the Lens
/// Loader's Gate 3 (every `connector_rules` name must resolve here) and by
/// the Planner at plan time. A `BTreeMap` so iteration (e.g. for listing
/// registered connectors in diagnostics) is always in a stable, sorted
/// order.
#[derive(Debug, Clone, Default)]
pub struct ConnectorRegistry {
    specs: BTreeMap<String, ConnectorSpec>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: ConnectorSpec) -> &mut Self {
        self.specs.insert(spec.name.clone(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ConnectorSpec> {
        self.specs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.specs.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.specs.keys().map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectorSpec> {
        self.specs.values()
    }
}
