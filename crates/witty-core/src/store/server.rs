//! HTTP front-end for the topic table.
//!
//! Dashboard clients read topics with `GET` and write them back with `PUT`.
//! A `PUT` counts as a remote write and fires `REMOTE_UPDATE` listeners.

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use witty_types::{StoreError, Value};

use super::{RemoteStore, StoreConnector, StoreResult, TopicStore};

type ApiResult<T> = Result<T, (StatusCode, String)>;

fn status_for(e: &StoreError) -> StatusCode {
    match e {
        StoreError::Closed => StatusCode::SERVICE_UNAVAILABLE,
        StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
        StoreError::Bind { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(e: StoreError) -> (StatusCode, String) {
    (status_for(&e), e.to_string())
}

/// Build the topic router over a shared store.
pub fn build_topic_router(store: Arc<TopicStore>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/topics", get(list_topics))
        .route("/topics/*path", get(get_topic).put(put_topic).delete(delete_topic))
        .layer(TraceLayer::new_for_http())
        .with_state(store)
}

async fn health(State(store): State<Arc<TopicStore>>) -> (StatusCode, Json<serde_json::Value>) {
    if store.is_closed() {
        return (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({"status": "closed"})));
    }
    (StatusCode::OK, Json(serde_json::json!({"status": "ok"})))
}

async fn list_topics(State(store): State<Arc<TopicStore>>) -> ApiResult<Json<BTreeMap<String, Value>>> {
    store.snapshot().map(Json).map_err(api_error)
}

async fn get_topic(
    State(store): State<Arc<TopicStore>>,
    Path(path): Path<String>,
) -> ApiResult<Json<Value>> {
    match store.get(&path).map_err(api_error)? {
        Some(value) => Ok(Json(value)),
        None => Err(api_error(StoreError::NotFound { path })),
    }
}

/// Accepts either the tagged form `{"type": "double", "value": 0.5}` or a
/// bare JSON value whose kind is inferred.
async fn put_topic(
    State(store): State<Arc<TopicStore>>,
    Path(path): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> ApiResult<StatusCode> {
    let value = match serde_json::from_value::<Value>(body.clone()) {
        Ok(value) => value,
        Err(_) => Value::from_json(body).map_err(|e| (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?,
    };
    tracing::debug!(path = %path, kind = %value.kind(), "Remote write");
    store.apply_remote(&path, value).map_err(api_error)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_topic(
    State(store): State<Arc<TopicStore>>,
    Path(path): Path<String>,
) -> ApiResult<StatusCode> {
    match store.unpublish(&path).map_err(api_error)? {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(api_error(StoreError::NotFound { path })),
    }
}

/// Connector that binds a TCP listener and serves a fresh [`TopicStore`].
///
/// The server task ends when the store is closed.
#[derive(Default)]
pub struct TopicServer {
    bound: Mutex<Option<(SocketAddr, Arc<TopicStore>)>>,
}

impl TopicServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address of the most recent successful bind. Useful with port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.bound.lock().as_ref().map(|(addr, _)| *addr)
    }

    /// Store served by the most recent successful bind.
    pub fn store(&self) -> Option<Arc<TopicStore>> {
        self.bound.lock().as_ref().map(|(_, store)| Arc::clone(store))
    }
}

#[async_trait]
impl StoreConnector for TopicServer {
    async fn open(&self, host: &str, port: u16) -> StoreResult<Arc<dyn RemoteStore>> {
        let addr = format!("{host}:{port}");
        let listener = TcpListener::bind(&addr).await.map_err(|e| StoreError::from_bind_error(&addr, &e))?;
        let local = listener.local_addr().map_err(|e| StoreError::from_bind_error(&addr, &e))?;

        let store = Arc::new(TopicStore::new());
        let mut closed = store.closed();
        let router = build_topic_router(Arc::clone(&store));

        tokio::spawn(async move {
            let shutdown = async move {
                let _ = closed.wait_for(|c| *c).await;
            };
            if let Err(e) = axum::serve(listener, router).with_graceful_shutdown(shutdown).await {
                tracing::error!("Topic server error: {}", e);
            }
            tracing::info!("Topic server on {} stopped", local);
        });

        tracing::info!("Topic server listening on http://{}", local);
        *self.bound.lock() = Some((local, Arc::clone(&store)));
        Ok(store)
    }
}
