//! Property tables: the typed key space a registrant exposes.
//!
//! A [`PropertyTable`] is filled by one [`Registrant::populate`] call per
//! publish cycle. Every entry pairs a [`Kind`] with a getter and an optional
//! setter. Kinds are fixed per key for the duration of a pass; a second
//! registration under the same key with another kind poisons that key for the
//! rest of the pass.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use witty_types::{Kind, PropertyError, PropertyType, Value};

use crate::registrant::Registrant;


/// Produces the current value of a property.
pub type Getter = Arc<dyn Fn() -> Value + Send + Sync>;
/// Applies a value written by a dashboard client.
pub type Setter = Arc<dyn Fn(Value) + Send + Sync>;

/// Result type for registrations.
pub type PropertyResult<T> = Result<T, PropertyError>;

/// Key of the synthetic entry that carries a table's dashboard type tag.
pub const TYPE_KEY: &str = ".type";

/// One registered property.
#[derive(Clone)]
pub struct TypedProperty {
    kind: Kind,
    getter: Getter,
    setter: Option<Setter>,
}

impl TypedProperty {
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// Current value as reported by the getter.
    pub fn read(&self) -> Value {
        (self.getter)()
    }

    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
}

impl fmt::Debug for TypedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedProperty")
            .field("kind", &self.kind)
            .field("writable", &self.is_writable())
            .finish_non_exhaustive()
    }
}

/// Per-object mapping from property key to typed getter/setter pair.
#[derive(Debug, Default)]
pub struct PropertyTable {
    properties: HashMap<String, TypedProperty>,
    /// Keys rejected this pass, with the kind they were first registered as.
    poisoned: HashMap<String, Kind>,
    conflicts: Vec<PropertyError>,
    type_tag: Option<String>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a property under `key`.
    ///
    /// Re-registering a key with the same kind replaces its getter and setter.
    /// A different kind fails with [`PropertyError::TypeConflict`] and removes
    /// the key from the table until the next pass. Failures are also recorded
    /// on the table (see [`conflicts`](Self::conflicts)).
    pub fn register(
        &mut self,
        key: impl Into<String>,
        kind: Kind,
        getter: Getter,
        setter: Option<Setter>,
    ) -> PropertyResult<()> {
        self.insert(key.into(), TypedProperty { kind, getter, setter })
    }

    fn insert(&mut self, key: String, property: TypedProperty) -> PropertyResult<()> {
        if key.is_empty() {
            return Err(self.reject(PropertyError::EmptyKey));
        }

        if let Some(&existing) = self.poisoned.get(&key) {
            if existing == property.kind {
                return Ok(());
            }
            return Err(self.reject(PropertyError::TypeConflict { key, existing, new: property.kind }));
        }

        let existing = match self.properties.get(&key) {
            Some(current) if current.kind != property.kind => current.kind,
            _ => {
                self.properties.insert(key, property);
                return Ok(());
            },
        };

        self.properties.remove(&key);
        self.poisoned.insert(key.clone(), existing);
        Err(self.reject(PropertyError::TypeConflict { key, existing, new: property.kind }))
    }

    fn reject(&mut self, error: PropertyError) -> PropertyError {
        self.conflicts.push(error.clone());
        error
    }

    /// Register a read-only property.
    pub fn add_read_only<T, G>(&mut self, key: &str, getter: G) -> &mut Self
    where
        T: PropertyType,
        G: Fn() -> T + Send + Sync + 'static,
    {
        // Failures are recorded on the table.
        let _ = self.register(key, T::KIND, Arc::new(move || getter().into_value()), None);
        self
    }

    /// Register a property a dashboard client may write back.
    ///
    /// Writes of any other kind never reach `setter`.
    pub fn add_read_write<T, G, S>(&mut self, key: &str, getter: G, setter: S) -> &mut Self
    where
        T: PropertyType,
        G: Fn() -> T + Send + Sync + 'static,
        S: Fn(T) + Send + Sync + 'static,
    {
        let setter: Setter = Arc::new(move |value: Value| {
            if let Some(value) = T::from_value(value) {
                setter(value);
            }
        });
        let _ = self.register(key, T::KIND, Arc::new(move || getter().into_value()), Some(setter));
        self
    }

    /// Merge a child registrant's properties under `name/`.
    ///
    /// The child's type tag is published at `name/.type`.
    pub fn add_child(&mut self, name: &str, child: &dyn Registrant) -> &mut Self {
        let mut nested = Self::new();
        child.populate(&mut nested);

        self.conflicts.extend(nested.conflicts.into_iter().map(|e| e.nested(name)));
        for (key, property) in nested.properties {
            let _ = self.insert(format!("{name}/{key}"), property);
        }
        if let Some(tag) = nested.type_tag {
            self.add_read_only(&format!("{name}/{TYPE_KEY}"), move || tag.clone());
        }
        self
    }

    /// Set the dashboard widget type published at `.type`.
    pub fn set_type(&mut self, tag: impl Into<String>) -> &mut Self {
        self.type_tag = Some(tag.into());
        self
    }

    pub fn type_tag(&self) -> Option<&str> {
        self.type_tag.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&TypedProperty> {
        self.properties.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TypedProperty)> {
        self.properties.iter()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Registration failures recorded during this pass.
    pub fn conflicts(&self) -> &[PropertyError] {
        &self.conflicts
    }

    pub(crate) fn take_conflicts(&mut self) -> Vec<PropertyError> {
        std::mem::take(&mut self.conflicts)
    }
}
