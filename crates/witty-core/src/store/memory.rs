use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{RemoteStore, StoreConnector, StoreResult, TopicStore};

/// Connector that hands out unbound in-process stores.
///
/// Every `open` creates a fresh [`TopicStore`]; the last one stays reachable
/// through [`store`](Self::store) so embedders can play the client side.
#[derive(Default)]
pub struct MemoryConnector {
    last: Mutex<Option<Arc<TopicStore>>>,
    opened: AtomicUsize,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> Option<Arc<TopicStore>> {
        self.last.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StoreConnector for MemoryConnector {
    async fn open(&self, host: &str, port: u16) -> StoreResult<Arc<dyn RemoteStore>> {
        let store = Arc::new(TopicStore::new());
        *self.last.lock() = Some(Arc::clone(&store));
        self.opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Opened in-process topic store for {}:{}", host, port);
        Ok(store)
    }
}
