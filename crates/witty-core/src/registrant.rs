//! The registrant contract.

use std::fmt;

use crate::property::PropertyTable;

/// An object that can describe itself as a set of named typed properties.
///
/// `populate` runs once per publish cycle, so it must register the same keys
/// with the same kinds every time it is called with unchanged state.
///
/// Getters and setters may be invoked concurrently: the publish loop reads
/// while the remote store's dispatch delivers writes. Implementors make each
/// getter/setter pair safe under that access pattern.
pub trait Registrant: Send + Sync {
    fn populate(&self, table: &mut PropertyTable);
}

/// Registrant backed by a closure.
pub struct FnRegistrant<F>(F);

impl<F> Registrant for FnRegistrant<F>
where
    F: Fn(&mut PropertyTable) + Send + Sync,
{
    fn populate(&self, table: &mut PropertyTable) {
        (self.0)(table);
    }
}

impl<F> fmt::Debug for FnRegistrant<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRegistrant")
    }
}

/// Wrap a closure as a [`Registrant`].
pub fn from_fn<F>(populate: F) -> FnRegistrant<F>
where
    F: Fn(&mut PropertyTable) + Send + Sync,
{
    FnRegistrant(populate)
}
