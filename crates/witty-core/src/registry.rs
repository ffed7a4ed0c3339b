//! Per-dashboard cache of builders and scalar listener claims.

use dashmap::{DashMap, DashSet};
use std::sync::Arc;

use crate::builder::PropertyBuilder;
use crate::registrant::Registrant;

/// At most one [`PropertyBuilder`] per top-level key, plus the set of raw
/// keys that already carry a scalar-put listener. Both only grow while a
/// store connection stays open.
#[derive(Debug, Default)]
pub struct Registry {
    builders: DashMap<String, Arc<PropertyBuilder>>,
    scalar_listeners: DashSet<String>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder cached for `key`, pointed at `registrant`.
    ///
    /// The first call creates the builder; later calls swap its registrant
    /// and keep its armed listeners.
    pub fn builder_for(&self, key: &str, registrant: Arc<dyn Registrant>) -> Arc<PropertyBuilder> {
        let entry = self
            .builders
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(PropertyBuilder::new(key, Arc::clone(&registrant))));
        let builder = Arc::clone(entry.value());
        drop(entry);
        builder.set_registrant(registrant);
        builder
    }

    pub fn get(&self, key: &str) -> Option<Arc<PropertyBuilder>> {
        self.builders.get(key).map(|b| Arc::clone(b.value()))
    }

    /// Returns `true` if this call is the first to claim `key`.
    pub fn claim_scalar_listener(&self, key: &str) -> bool {
        self.scalar_listeners.insert(key.to_string())
    }

    /// Give a claim back after a failed subscription so a later put retries.
    pub fn release_scalar_listener(&self, key: &str) {
        self.scalar_listeners.remove(key);
    }

    pub fn has_scalar_listener(&self, key: &str) -> bool {
        self.scalar_listeners.contains(key)
    }

    /// Drop every listener claim. A freshly opened store has no listeners,
    /// so each path is armed again on its next publish.
    pub(crate) fn reset_listeners(&self) {
        self.scalar_listeners.clear();
        for builder in self.builders.iter() {
            builder.disarm();
        }
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::PropertyTable;
    use crate::registrant::from_fn;

    fn empty() -> Arc<dyn Registrant> {
        Arc::new(from_fn(|_: &mut PropertyTable| {}))
    }

    #[test]
    fn test_one_builder_per_key() {
        let registry = Registry::new();
        let first = registry.builder_for("servo1", empty());
        let second = registry.builder_for("servo1", empty());
        registry.builder_for("motor1", empty());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 2);
        assert!(registry.get("servo1").is_some());
        assert!(registry.get("servo2").is_none());
    }

    #[test]
    fn test_scalar_claims() {
        let registry = Registry::new();
        assert!(registry.claim_scalar_listener("speed"));
        assert!(!registry.claim_scalar_listener("speed"));

        registry.release_scalar_listener("speed");
        assert!(!registry.has_scalar_listener("speed"));
        assert!(registry.claim_scalar_listener("speed"));
    }
}
