//! Property builder: publishes one registrant under a top-level key.
//!
//! Each cycle collects a fresh [`PropertyTable`], pushes every value to
//! `key/subkey`, and arms at most one `REMOTE_UPDATE` listener per writable
//! path for the lifetime of the builder, even when cycles overlap. Listeners look up the setter at
//! delivery time, so swapping the registrant never requires re-arming.

use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use witty_types::{Kind, PropertyError};

use crate::property::{PropertyTable, Setter, TYPE_KEY};
use crate::registrant::Registrant;
use crate::store::{join_path, RemoteStore, TopicEvent, TopicEvents};

#[derive(Clone)]
struct Slot {
    kind: Kind,
    setter: Setter,
}

type Slots = Arc<RwLock<HashMap<String, Slot>>>;

/// Outcome of one publish cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishReport {
    /// Properties pushed successfully this cycle (the type marker excluded).
    pub published: usize,
    /// Listeners armed this cycle.
    pub armed: usize,
    pub conflicts: Vec<PropertyError>,
}

impl PublishReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

pub struct PropertyBuilder {
    key: String,
    registrant: RwLock<Arc<dyn Registrant>>,
    slots: Slots,
    armed: Mutex<HashSet<String>>,
    dropped: Arc<AtomicU64>,
}

impl PropertyBuilder {
    pub fn new(key: impl Into<String>, registrant: Arc<dyn Registrant>) -> Self {
        Self {
            key: key.into(),
            registrant: RwLock::new(registrant),
            slots: Arc::new(RwLock::new(HashMap::new())),
            armed: Mutex::new(HashSet::new()),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the registrant published by later cycles.
    pub fn set_registrant(&self, registrant: Arc<dyn Registrant>) {
        *self.registrant.write() = registrant;
    }

    /// Run one collect / publish / arm cycle against `store`.
    ///
    /// Store failures are logged and left for the next cycle; conflicts are
    /// returned in the report and skip only the offending key.
    pub fn publish(&self, store: &dyn RemoteStore) -> PublishReport {
        let registrant = Arc::clone(&*self.registrant.read());
        let mut table = PropertyTable::new();
        registrant.populate(&mut table);

        let mut report = PublishReport { conflicts: table.take_conflicts(), ..PublishReport::default() };
        let mut writable = HashMap::new();

        for (subkey, property) in table.iter() {
            let value = property.read();
            if value.kind() != property.kind() {
                report.conflicts.push(PropertyError::TypeConflict {
                    key: subkey.clone(),
                    existing: property.kind(),
                    new: value.kind(),
                });
                continue;
            }

            let path = join_path(&self.key, subkey);
            match store.put(&path, value) {
                Ok(()) => report.published += 1,
                Err(e) => tracing::warn!("Failed to publish {}: {}", path, e),
            }

            if let Some(setter) = property.setter() {
                writable.insert(path, Slot { kind: property.kind(), setter: Arc::clone(setter) });
            }
        }

        // Claimed under the lock so concurrent cycles never subscribe one path twice.
        let pending: Vec<String> = {
            let mut armed = self.armed.lock();
            writable.keys().filter(|path| armed.insert((*path).clone())).cloned().collect()
        };
        *self.slots.write() = writable;

        for path in pending {
            if self.arm(store, &path) {
                report.armed += 1;
            }
        }

        if let Some(tag) = table.type_tag() {
            let path = join_path(&self.key, TYPE_KEY);
            if let Err(e) = store.put_string(&path, tag) {
                tracing::warn!("Failed to publish {}: {}", path, e);
            }
        }

        for conflict in &report.conflicts {
            tracing::debug!("{}: skipped key: {}", self.key, conflict);
        }
        tracing::trace!(
            key = %self.key,
            published = report.published,
            armed = report.armed,
            "Publish cycle complete"
        );
        report
    }

    fn arm(&self, store: &dyn RemoteStore, path: &str) -> bool {
        let slots = Arc::clone(&self.slots);
        let dropped = Arc::clone(&self.dropped);
        let callback = Arc::new(move |event: &TopicEvent| deliver(&slots, &dropped, event));

        match store.add_listener(path, TopicEvents::REMOTE_UPDATE, callback) {
            Ok(_) => {
                tracing::debug!("Armed listener on {}", path);
                true
            },
            Err(e) => {
                self.armed.lock().remove(path);
                tracing::warn!("Failed to subscribe to {}: {}", path, e);
                false
            },
        }
    }

    /// Inbound writes dropped because their kind did not match.
    pub fn dropped_writes(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Forget armed listeners. Used when the builder moves to a new store.
    pub(crate) fn disarm(&self) {
        self.armed.lock().clear();
    }

    pub fn armed_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.armed.lock().iter().cloned().collect();
        paths.sort();
        paths
    }
}

fn deliver(slots: &RwLock<HashMap<String, Slot>>, dropped: &AtomicU64, event: &TopicEvent) {
    // Clone out so the setter runs without the lock held.
    let Some(slot) = slots.read().get(&event.path).cloned() else {
        tracing::debug!("No writable property at {}; ignoring remote write", event.path);
        return;
    };

    if event.value.kind() != slot.kind {
        dropped.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            "Dropped remote write to {}: expected {}, got {}",
            event.path,
            slot.kind,
            event.value.kind()
        );
        return;
    }
    (slot.setter)(event.value.clone());
}

impl fmt::Debug for PropertyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyBuilder")
            .field("key", &self.key)
            .field("armed", &self.armed.lock().len())
            .field("dropped", &self.dropped_writes())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
impl PropertyBuilder {
    /// Deliver a value directly, as a matching remote write would.
    fn inject(&self, path: &str, value: witty_types::Value) {
        let event = TopicEvent { path: path.to_string(), event: TopicEvents::REMOTE_UPDATE, value };
        deliver(&self.slots, &self.dropped, &event);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::registrant::from_fn;
    use crate::store::{ListenerHandle, StoreResult, TopicCallback, TopicStore};
    use std::sync::atomic::{AtomicBool, AtomicUsize};
    use std::time::Duration;
    use witty_types::Value;

    /// Topic store wrapper that counts subscriptions and can refuse or stall them.
    #[derive(Default)]
    struct CountingStore {
        inner: TopicStore,
        subscriptions: AtomicUsize,
        refuse: AtomicBool,
        slow: AtomicBool,
    }

    impl RemoteStore for CountingStore {
        fn put(&self, path: &str, value: Value) -> StoreResult<()> {
            self.inner.put(path, value)
        }

        fn get(&self, path: &str) -> StoreResult<Option<Value>> {
            self.inner.get(path)
        }

        fn add_listener(&self, path: &str, events: TopicEvents, callback: TopicCallback) -> StoreResult<ListenerHandle> {
            if self.refuse.load(Ordering::SeqCst) {
                return Err(witty_types::StoreError::Closed);
            }
            self.subscriptions.fetch_add(1, Ordering::SeqCst);
            if self.slow.load(Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(50));
            }
            self.inner.add_listener(path, events, callback)
        }

        fn remove_listener(&self, handle: ListenerHandle) -> bool {
            self.inner.remove_listener(handle)
        }

        fn close(&self) {
            self.inner.close();
        }
    }

    fn servo(position: Arc<RwLock<f64>>) -> Arc<dyn Registrant> {
        Arc::new(from_fn(move |table: &mut PropertyTable| {
            let read = Arc::clone(&position);
            let write = Arc::clone(&position);
            table
                .set_type("Servo")
                .add_read_write("Value", move || *read.read(), move |v: f64| *write.write() = v)
                .add_read_only("Device name", || "servo1".to_string());
        }))
    }

    #[test]
    fn test_publish_pushes_values_and_type_marker() {
        let store = CountingStore::default();
        let builder = PropertyBuilder::new("servo1", servo(Arc::new(RwLock::new(0.5))));

        let report = builder.publish(&store);

        assert_eq!(report.published, 2);
        assert_eq!(report.armed, 1);
        assert!(report.is_clean());
        assert_eq!(store.get("servo1/Value").unwrap(), Some(Value::Double(0.5)));
        assert_eq!(store.get("servo1/.type").unwrap(), Some(Value::String("Servo".to_string())));
        assert_eq!(store.inner.listener_count("servo1/Value"), 1);
    }

    #[test]
    fn test_listeners_are_armed_once() {
        let store = CountingStore::default();
        let builder = PropertyBuilder::new("servo1", servo(Arc::new(RwLock::new(0.5))));

        for _ in 0..5 {
            builder.publish(&store);
        }

        assert_eq!(store.subscriptions.load(Ordering::SeqCst), 1);
        assert_eq!(builder.armed_paths(), vec!["servo1/Value".to_string()]);
    }

    #[test]
    fn test_read_only_properties_never_subscribe() {
        let store = CountingStore::default();
        let registrant: Arc<dyn Registrant> = Arc::new(from_fn(|table: &mut PropertyTable| {
            table.add_read_only("Current", || 1.25_f64).add_read_only("Is Over Current", || false);
        }));
        let builder = PropertyBuilder::new("motor", registrant);

        builder.publish(&store);

        assert_eq!(store.subscriptions.load(Ordering::SeqCst), 0);
        assert!(store.get("motor/.type").unwrap().is_none());
    }

    #[test]
    fn test_remote_write_round_trips_through_setter() {
        let store = CountingStore::default();
        let position = Arc::new(RwLock::new(0.5));
        let builder = PropertyBuilder::new("servo1", servo(Arc::clone(&position)));
        builder.publish(&store);

        store.inner.apply_remote("servo1/Value", Value::Double(0.9)).unwrap();
        assert_eq!(*position.read(), 0.9);

        builder.publish(&store);
        assert_eq!(store.get("servo1/Value").unwrap(), Some(Value::Double(0.9)));
    }

    #[test]
    fn test_mismatched_remote_write_is_dropped() {
        let store = CountingStore::default();
        let position = Arc::new(RwLock::new(0.5));
        let builder = PropertyBuilder::new("servo1", servo(Arc::clone(&position)));
        builder.publish(&store);

        store.inner.apply_remote("servo1/Value", Value::String("fast".to_string())).unwrap();

        assert_eq!(*position.read(), 0.5);
        assert_eq!(builder.dropped_writes(), 1);

        builder.publish(&store);
        assert_eq!(store.get("servo1/Value").unwrap(), Some(Value::Double(0.5)));
    }

    #[test]
    fn test_conflicting_key_is_skipped_and_reported() {
        let store = CountingStore::default();
        let registrant: Arc<dyn Registrant> = Arc::new(from_fn(|table: &mut PropertyTable| {
            table
                .add_read_only("K", || 1.0_f64)
                .add_read_only("K", || "one".to_string())
                .add_read_only("Other", || 7_i64);
        }));
        let builder = PropertyBuilder::new("root", registrant);

        let report = builder.publish(&store);

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.published, 1);
        assert_eq!(store.get("root/K").unwrap(), None);
        assert_eq!(store.get("root/Other").unwrap(), Some(Value::Int(7)));
    }

    #[test]
    fn test_getter_kind_drift_is_a_conflict() {
        let store = CountingStore::default();
        let registrant: Arc<dyn Registrant> = Arc::new(from_fn(|table: &mut PropertyTable| {
            let _ = table.register("K", Kind::Double, Arc::new(|| Value::Int(3)), None);
        }));
        let builder = PropertyBuilder::new("root", registrant);

        let report = builder.publish(&store);

        assert_eq!(
            report.conflicts,
            vec![PropertyError::TypeConflict { key: "K".to_string(), existing: Kind::Double, new: Kind::Int }]
        );
        assert_eq!(store.get("root/K").unwrap(), None);
    }

    #[test]
    fn test_failed_subscription_is_retried() {
        let store = CountingStore::default();
        store.refuse.store(true, Ordering::SeqCst);
        let builder = PropertyBuilder::new("servo1", servo(Arc::new(RwLock::new(0.5))));

        assert_eq!(builder.publish(&store).armed, 0);
        assert!(builder.armed_paths().is_empty());

        store.refuse.store(false, Ordering::SeqCst);
        assert_eq!(builder.publish(&store).armed, 1);
        assert_eq!(builder.publish(&store).armed, 0);
    }

    #[test]
    fn test_swapped_registrant_receives_writes_without_rearming() {
        let store = CountingStore::default();
        let old = Arc::new(RwLock::new(0.0));
        let new = Arc::new(RwLock::new(0.0));
        let builder = PropertyBuilder::new("servo1", servo(Arc::clone(&old)));
        builder.publish(&store);

        builder.set_registrant(servo(Arc::clone(&new)));
        builder.publish(&store);
        builder.inject("servo1/Value", Value::Double(0.3));

        assert_eq!(*old.read(), 0.0);
        assert_eq!(*new.read(), 0.3);
        assert_eq!(store.subscriptions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_overlapping_cycles_subscribe_once() {
        let store = CountingStore::default();
        store.slow.store(true, Ordering::SeqCst);
        let builder = PropertyBuilder::new("servo1", servo(Arc::new(RwLock::new(0.5))));

        let armed: usize = std::thread::scope(|scope| {
            let cycles: Vec<_> = (0..4).map(|_| scope.spawn(|| builder.publish(&store).armed)).collect();
            cycles.into_iter().map(|cycle| cycle.join().unwrap()).sum()
        });

        assert_eq!(armed, 1);
        assert_eq!(store.subscriptions.load(Ordering::SeqCst), 1);
        assert_eq!(store.inner.listener_count("servo1/Value"), 1);
    }

    #[test]
    fn test_refused_claim_is_released_for_the_next_cycle() {
        let store = CountingStore::default();
        store.refuse.store(true, Ordering::SeqCst);
        let builder = PropertyBuilder::new("servo1", servo(Arc::new(RwLock::new(0.5))));

        std::thread::scope(|scope| {
            for _ in 0..3 {
                scope.spawn(|| builder.publish(&store));
            }
        });
        assert!(builder.armed_paths().is_empty());

        store.refuse.store(false, Ordering::SeqCst);
        builder.publish(&store);
        assert_eq!(store.inner.listener_count("servo1/Value"), 1);
    }
}
