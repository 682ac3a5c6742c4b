use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::api::ApiError;
use crate::models::BetEvent;
use crate::storage::{BettingStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<BettingStore>>,
    /// JSON messages fanned out to every websocket client
    pub events: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(store: BettingStore, broadcast_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(broadcast_capacity);
        Self {
            store: Arc::new(RwLock::new(store)),
            events,
        }
    }

    /// Run a store write on the blocking pool, since writes rewrite JSONL files.
    pub async fn write<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&mut BettingStore) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);

        tokio::task::spawn_blocking(move || {
            let mut guard = store.blocking_write();
            op(&mut guard)
        })
        .await
        .map_err(|e| ApiError::Internal(format!("store write task failed: {}", e)))?
        .map_err(ApiError::from)
    }

    /// Push an event to connected websocket clients.
    pub fn broadcast(&self, event: &BetEvent) {
        match serde_json::to_string(event) {
            Ok(json) => {
                // Err only means nobody is listening.
                let receivers = self.events.send(json).unwrap_or(0);
                tracing::debug!("Broadcast bet event to {} clients", receivers);
            }
            Err(e) => tracing::warn!("Failed to serialize bet event: {}", e),
        }
    }
}
