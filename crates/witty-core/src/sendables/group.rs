use parking_lot::RwLock;
use std::sync::Arc;

use crate::property::PropertyTable;
use crate::registrant::Registrant;

/// Composite registrant: every child is published at `parent/child/...`.
#[derive(Default)]
pub struct SendableGroup {
    type_tag: Option<String>,
    children: RwLock<Vec<(String, Arc<dyn Registrant>)>>,
}

impl SendableGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(tag: impl Into<String>) -> Self {
        Self { type_tag: Some(tag.into()), children: RwLock::default() }
    }

    /// Add or replace the child published under `name`.
    pub fn add(&self, name: impl Into<String>, child: Arc<dyn Registrant>) {
        let name = name.into();
        let mut children = self.children.write();
        match children.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = child,
            None => children.push((name, child)),
        }
    }

    pub fn remove(&self, name: &str) -> Option<Arc<dyn Registrant>> {
        let mut children = self.children.write();
        let index = children.iter().position(|(n, _)| n == name)?;
        Some(children.remove(index).1)
    }

    pub fn names(&self) -> Vec<String> {
        self.children.read().iter().map(|(n, _)| n.clone()).collect()
    }
}

impl Registrant for SendableGroup {
    fn populate(&self, table: &mut PropertyTable) {
        if let Some(tag) = &self.type_tag {
            table.set_type(tag.clone());
        }
        // Snapshot so a child may touch the group while populating.
        let children = self.children.read().clone();
        for (name, child) in &children {
            table.add_child(name, child.as_ref());
        }
    }
}
