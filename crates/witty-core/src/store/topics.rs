//! In-process topic table with listener dispatch.

use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use witty_types::{StoreError, Value};

use super::{ListenerHandle, RemoteStore, StoreResult, TopicCallback, TopicEvent, TopicEvents};

struct Listener {
    id: u64,
    events: TopicEvents,
    callback: TopicCallback,
}

/// Topic table shared between this process and dashboard clients.
///
/// Local publishes go through [`RemoteStore::put`]; writes coming from a
/// client go through [`TopicStore::apply_remote`]. Listeners run
/// synchronously on the thread that performed the write, after every map
/// guard has been released.
pub struct TopicStore {
    topics: DashMap<String, Value>,
    listeners: DashMap<String, Vec<Arc<Listener>>>,
    next_listener: AtomicU64,
    closed_tx: watch::Sender<bool>,
}

impl TopicStore {
    pub fn new() -> Self {
        let (closed_tx, _) = watch::channel(false);
        Self {
            topics: DashMap::new(),
            listeners: DashMap::new(),
            next_listener: AtomicU64::new(1),
            closed_tx,
        }
    }

    /// Apply a write made by a dashboard client.
    pub fn apply_remote(&self, path: &str, value: Value) -> StoreResult<()> {
        self.write(path, value, TopicEvents::REMOTE_UPDATE)
    }

    /// Remove a topic, notifying `UNPUBLISHED` listeners with its last value.
    pub fn unpublish(&self, path: &str) -> StoreResult<Option<Value>> {
        self.ensure_open()?;
        let removed = self.topics.remove(path).map(|(_, value)| value);
        if let Some(value) = &removed {
            self.notify(path, TopicEvents::UNPUBLISHED, value);
        }
        Ok(removed)
    }

    /// Copy of every published topic, ordered by path.
    pub fn snapshot(&self) -> StoreResult<BTreeMap<String, Value>> {
        self.ensure_open()?;
        Ok(self.topics.iter().map(|e| (e.key().clone(), e.value().clone())).collect())
    }

    pub fn listener_count(&self, path: &str) -> usize {
        self.listeners.get(path).map_or(0, |l| l.len())
    }

    pub fn is_closed(&self) -> bool {
        *self.closed_tx.borrow()
    }

    /// Receiver that flips to `true` when the store is closed.
    pub fn closed(&self) -> watch::Receiver<bool> {
        self.closed_tx.subscribe()
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(())
    }

    fn write(&self, path: &str, value: Value, event: TopicEvents) -> StoreResult<()> {
        self.ensure_open()?;
        let is_new = self.topics.insert(path.to_string(), value.clone()).is_none();
        if is_new {
            self.notify(path, TopicEvents::PUBLISHED, &value);
        }
        self.notify(path, event, &value);
        Ok(())
    }

    fn notify(&self, path: &str, event: TopicEvents, value: &Value) {
        let targets: Vec<Arc<Listener>> = self
            .listeners
            .get(path)
            .map(|listeners| listeners.iter().filter(|l| l.events.intersects(event)).cloned().collect())
            .unwrap_or_default();
        if targets.is_empty() {
            return;
        }

        let event = TopicEvent { path: path.to_string(), event, value: value.clone() };
        for listener in targets {
            tracing::trace!(path, id = listener.id, "dispatching topic event");
            (listener.callback)(&event);
        }
    }
}

impl Default for TopicStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteStore for TopicStore {
    fn put(&self, path: &str, value: Value) -> StoreResult<()> {
        self.write(path, value, TopicEvents::LOCAL_UPDATE)
    }

    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        self.ensure_open()?;
        Ok(self.topics.get(path).map(|v| v.value().clone()))
    }

    fn add_listener(
        &self,
        path: &str,
        events: TopicEvents,
        callback: TopicCallback,
    ) -> StoreResult<ListenerHandle> {
        self.ensure_open()?;
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .entry(path.to_string())
            .or_default()
            .push(Arc::new(Listener { id, events, callback }));
        Ok(ListenerHandle(id))
    }

    fn remove_listener(&self, handle: ListenerHandle) -> bool {
        let mut removed = false;
        for mut entry in self.listeners.iter_mut() {
            let before = entry.len();
            entry.retain(|l| l.id != handle.0);
            removed |= entry.len() != before;
        }
        removed
    }

    fn close(&self) {
        if self.closed_tx.send_replace(true) {
            return;
        }
        self.listeners.clear();
        tracing::debug!("Topic store closed");
    }
}
