//! Remote key-value store boundary.
//!
//! The registry only talks to the network through [`RemoteStore`]. A
//! [`StoreConnector`] opens a store for the dashboard at `start`.
//!
//! ```text
//! PropertyBuilder ──put / add_listener──► TopicStore ◄──HTTP PUT── dashboard
//!        ▲                                    │
//!        └──────────── REMOTE_UPDATE ─────────┘
//! ```

mod memory;
mod server;
mod topics;

pub use memory::MemoryConnector;
pub use server::{build_topic_router, TopicServer};
pub use topics::TopicStore;

use async_trait::async_trait;
use bitflags::bitflags;
use std::sync::Arc;
use witty_types::{StoreError, Value};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

bitflags! {
    /// Topic events a listener can subscribe to.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TopicEvents: u8 {
        /// A topic appeared for the first time.
        const PUBLISHED = 1;
        /// The owning process wrote a new value.
        const LOCAL_UPDATE = 1 << 1;
        /// A dashboard client wrote a new value.
        const REMOTE_UPDATE = 1 << 2;
        /// The topic was removed.
        const UNPUBLISHED = 1 << 3;
        const VALUE_UPDATE = Self::LOCAL_UPDATE.bits() | Self::REMOTE_UPDATE.bits();
    }
}

/// A single notification delivered to a listener.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicEvent {
    pub path: String,
    /// The one event flag that fired.
    pub event: TopicEvents,
    /// Value after the event (the last value for `UNPUBLISHED`).
    pub value: Value,
}

/// Listener callback. Runs on the store's dispatch context.
pub type TopicCallback = Arc<dyn Fn(&TopicEvent) + Send + Sync>;

/// Identifies an installed listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerHandle(pub(crate) u64);

/// Key-value table shared with dashboard clients.
pub trait RemoteStore: Send + Sync {
    /// Publish a value from this process.
    fn put(&self, path: &str, value: Value) -> StoreResult<()>;

    /// Current value at `path`, or `None` if nothing is published there.
    fn get(&self, path: &str) -> StoreResult<Option<Value>>;

    fn add_listener(
        &self,
        path: &str,
        events: TopicEvents,
        callback: TopicCallback,
    ) -> StoreResult<ListenerHandle>;

    /// Returns `false` if the handle was unknown.
    fn remove_listener(&self, handle: ListenerHandle) -> bool;

    /// Close the connection. Later operations fail with [`StoreError::Closed`].
    fn close(&self);

    fn put_boolean(&self, path: &str, value: bool) -> StoreResult<()> {
        self.put(path, Value::Bool(value))
    }

    fn put_number(&self, path: &str, value: f64) -> StoreResult<()> {
        self.put(path, Value::Double(value))
    }

    fn put_string(&self, path: &str, value: &str) -> StoreResult<()> {
        self.put(path, Value::String(value.to_string()))
    }

    fn put_raw(&self, path: &str, value: &[u8]) -> StoreResult<()> {
        self.put(path, Value::Raw(value.to_vec()))
    }

    fn put_boolean_array(&self, path: &str, value: &[bool]) -> StoreResult<()> {
        self.put(path, Value::BoolArray(value.to_vec()))
    }

    fn put_number_array(&self, path: &str, value: &[f64]) -> StoreResult<()> {
        self.put(path, Value::DoubleArray(value.to_vec()))
    }

    fn put_string_array(&self, path: &str, value: &[String]) -> StoreResult<()> {
        self.put(path, Value::StringArray(value.to_vec()))
    }
}

/// Opens a [`RemoteStore`] for a dashboard.
#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Bind or connect at `host:port`.
    async fn open(&self, host: &str, port: u16) -> StoreResult<Arc<dyn RemoteStore>>;
}

/// Join a parent key and a child key with `/`.
pub fn join_path(parent: &str, child: &str) -> String {
    format!("{parent}/{child}")
}
