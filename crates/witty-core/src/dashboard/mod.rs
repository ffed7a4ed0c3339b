//! Dashboard orchestrator.
//!
//! Owns the remote store connection and a background task that republishes
//! the root registrant every period. A [`Dashboard`] is built once at the
//! composition root and cloned wherever it is needed.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use witty_types::{DashboardConfig, PropertyError, PropertyType, StoreError, Value};

use crate::builder::PublishReport;
use crate::error::{DashboardError, DashboardResult};
use crate::registrant::Registrant;
use crate::registry::Registry;
use crate::store::{RemoteStore, StoreConnector, TopicEvent, TopicEvents};


/// What `put` publishes: a registrant tree or a single scalar.
pub enum DashboardValue {
    Registrant(Arc<dyn Registrant>),
    Scalar(Value),
}

impl From<Value> for DashboardValue {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}

impl From<&str> for DashboardValue {
    fn from(value: &str) -> Self {
        Self::Scalar(Value::String(value.to_string()))
    }
}

impl From<i32> for DashboardValue {
    fn from(value: i32) -> Self {
        Self::Scalar(Value::Int(i64::from(value)))
    }
}

impl<T: Registrant + 'static> From<Arc<T>> for DashboardValue {
    fn from(registrant: Arc<T>) -> Self {
        Self::Registrant(registrant)
    }
}

impl From<Arc<dyn Registrant>> for DashboardValue {
    fn from(registrant: Arc<dyn Registrant>) -> Self {
        Self::Registrant(registrant)
    }
}

macro_rules! scalar_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for DashboardValue {
                fn from(value: $ty) -> Self {
                    Self::Scalar(value.into_value())
                }
            }
        )*
    };
}

scalar_from!(bool, i64, f32, f64, String, Vec<u8>, Vec<bool>, Vec<i64>, Vec<f32>, Vec<f64>, Vec<String>);

struct Ticker {
    shutdown_tx: watch::Sender<bool>,
    // Dropping the handle detaches the task; stop never waits on a tick.
    _handle: JoinHandle<()>,
}

struct DashboardInner {
    config: DashboardConfig,
    connector: Arc<dyn StoreConnector>,
    registry: Registry,
    store: RwLock<Option<Arc<dyn RemoteStore>>>,
    root: RwLock<Option<Arc<dyn Registrant>>>,
    running: AtomicBool,
    /// Serialises `start` and `stop`.
    lifecycle: Mutex<Option<Ticker>>,
}

impl Drop for DashboardInner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(ticker) = self.lifecycle.get_mut().take() {
            let _ = ticker.shutdown_tx.send(true);
        }
        if let Some(store) = self.store.get_mut().take() {
            store.close();
        }
    }
}

/// Handle to a dashboard. Clones share state.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

impl Dashboard {
    pub fn new(config: DashboardConfig, connector: Arc<dyn StoreConnector>) -> Self {
        Self {
            inner: Arc::new(DashboardInner {
                config,
                connector,
                registry: Registry::new(),
                store: RwLock::new(None),
                root: RwLock::new(None),
                running: AtomicBool::new(false),
                lifecycle: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    pub fn is_running(&self) -> bool {
        self.inner.running.load(Ordering::SeqCst)
    }

    /// Open the remote store and start the publish loop.
    ///
    /// `root` replaces the root registrant when given; `None` keeps the
    /// current one. Fails with [`DashboardError::AlreadyRunning`] without
    /// touching any state if the dashboard is already running.
    pub async fn start(&self, root: Option<Arc<dyn Registrant>>) -> DashboardResult<()> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if self.is_running() {
            return Err(DashboardError::AlreadyRunning);
        }

        let config = &self.inner.config;
        let store = self.inner.connector.open(&config.host, config.port).await.map_err(|e| {
            DashboardError::ServerUnavailable { addr: config.addr(), message: e.to_string() }
        })?;

        if let Some(root) = root {
            *self.inner.root.write() = Some(root);
        }
        self.inner.registry.reset_listeners();
        *self.inner.store.write() = Some(store);
        self.inner.running.store(true, Ordering::SeqCst);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(run_publish_loop(Arc::downgrade(&self.inner), config.period(), shutdown_rx));
        *lifecycle = Some(Ticker { shutdown_tx, _handle: handle });

        tracing::info!("Dashboard started on {} (period {} ms)", config.addr(), config.period_ms);
        Ok(())
    }

    /// Stop the publish loop and close the remote store.
    ///
    /// No publish starts after this returns; a tick already in flight may
    /// finish its store calls.
    pub async fn stop(&self) -> DashboardResult<()> {
        let mut lifecycle = self.inner.lifecycle.lock().await;
        if !self.inner.running.swap(false, Ordering::SeqCst) {
            return Err(DashboardError::NotRunning);
        }

        if let Some(ticker) = lifecycle.take() {
            let _ = ticker.shutdown_tx.send(true);
        }
        let store = self.inner.store.write().take();
        if let Some(store) = store {
            store.close();
        }

        tracing::info!("Dashboard stopped");
        Ok(())
    }

    /// Replace the root registrant. Takes effect on the next tick.
    pub fn set_root(&self, root: Arc<dyn Registrant>) {
        *self.inner.root.write() = Some(root);
    }

    /// Publish the root registrant once under the configured root key.
    ///
    /// Returns `Ok(None)` when no root is set.
    pub fn publish_root(&self) -> DashboardResult<Option<PublishReport>> {
        self.inner.publish_root()
    }

    /// Publish a registrant tree or a scalar under `key`.
    ///
    /// Registrants go through the key's cached builder, so their writable
    /// properties are subscribed once no matter how often they are put.
    pub fn put(&self, key: &str, value: impl Into<DashboardValue>) -> DashboardResult<()> {
        match value.into() {
            DashboardValue::Registrant(registrant) => self.put_registrant(key, registrant).map(|_| ()),
            DashboardValue::Scalar(value) => {
                self.inner.connection()?.put(key, value)?;
                Ok(())
            },
        }
    }

    /// Publish one cycle of `registrant` under `key`.
    ///
    /// A cycle that skipped conflicting keys fails with
    /// [`DashboardError::Conflicts`]; every other key was still published.
    pub fn put_registrant(&self, key: &str, registrant: Arc<dyn Registrant>) -> DashboardResult<PublishReport> {
        let builder = self.inner.registry.builder_for(key, registrant);
        let store = self.inner.connection()?;
        let report = builder.publish(store.as_ref());
        if !report.is_clean() {
            return Err(DashboardError::Conflicts { key: key.to_string(), conflicts: report.conflicts });
        }
        Ok(report)
    }

    /// Publish a scalar and subscribe `setter` to remote writes of `key`.
    ///
    /// Only the first call for a key installs a listener; later calls just
    /// publish. Remote writes of another kind never reach `setter`.
    pub fn put_with_setter<T, S>(&self, key: &str, value: T, setter: S) -> DashboardResult<()>
    where
        T: PropertyType,
        S: Fn(T) + Send + Sync + 'static,
    {
        let store = self.inner.connection()?;
        store.put(key, value.into_value())?;

        if !self.inner.registry.claim_scalar_listener(key) {
            return Ok(());
        }

        let callback = Arc::new(move |event: &TopicEvent| match T::from_value(event.value.clone()) {
            Some(value) => setter(value),
            None => tracing::debug!(
                "Dropped remote write to {}: expected {}, got {}",
                event.path,
                T::KIND,
                event.value.kind()
            ),
        });
        if let Err(e) = store.add_listener(key, TopicEvents::REMOTE_UPDATE, callback) {
            self.inner.registry.release_scalar_listener(key);
            return Err(e.into());
        }
        tracing::debug!("Armed scalar listener on {}", key);
        Ok(())
    }

    /// Publish an untyped JSON value, inferring its kind.
    pub fn put_json(&self, key: &str, json: serde_json::Value) -> DashboardResult<()> {
        let value = Value::from_json(json)?;
        self.put(key, value)
    }

    /// Current remote value of `key`. Never waits for one to appear.
    pub fn get(&self, key: &str) -> DashboardResult<Option<Value>> {
        Ok(self.inner.connection()?.get(key)?)
    }

    /// Inbound writes dropped by the builder at `key` for carrying the wrong kind.
    pub fn dropped_writes(&self, key: &str) -> u64 {
        self.inner.registry.get(key).map_or(0, |b| b.dropped_writes())
    }
}

impl DashboardInner {
    fn connection(&self) -> Result<Arc<dyn RemoteStore>, StoreError> {
        self.store.read().clone().ok_or(StoreError::Closed)
    }

    fn publish_root(&self) -> DashboardResult<Option<PublishReport>> {
        let Some(root) = self.root.read().clone() else {
            return Ok(None);
        };
        let store = self.connection()?;
        let builder = self.registry.builder_for(&self.config.root_key, root);
        Ok(Some(builder.publish(store.as_ref())))
    }
}

/// A loop whose shutdown was signalled stays stopped even if a later
/// `start` has set `running` again.
fn may_publish(running: &AtomicBool, shutdown_rx: &watch::Receiver<bool>) -> bool {
    running.load(Ordering::SeqCst) && !*shutdown_rx.borrow()
}

async fn run_publish_loop(inner: Weak<DashboardInner>, period: Duration, mut shutdown_rx: watch::Receiver<bool>) {
    let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_conflicts: Vec<PropertyError> = Vec::new();

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let Some(inner) = inner.upgrade() else { break };
                if !may_publish(&inner.running, &shutdown_rx) {
                    break;
                }
                match inner.publish_root() {
                    Ok(Some(report)) => {
                        if report.conflicts != last_conflicts {
                            for conflict in &report.conflicts {
                                tracing::warn!("Root publish skipped a key: {}", conflict);
                            }
                            last_conflicts = report.conflicts;
                        }
                    },
                    Ok(None) => {},
                    Err(e) => tracing::warn!("Root publish failed: {}", e),
                }
            }
            _ = shutdown_rx.changed() => break,
        }
    }
    tracing::debug!("Publish loop exited");
}
