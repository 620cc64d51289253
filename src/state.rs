use std::sync::Arc;

use tokio::sync::broadcast;

use crate::observability::metrics::Metrics;
use crate::registry::RequestRegistry;
use crate::store::memory::MemoryStore;
use crate::store::DocumentStore;

pub struct AppState {
    pub registry: RequestRegistry,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(event_buffer_size: usize) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), event_buffer_size)
    }

    pub fn with_store(store: Arc<dyn DocumentStore>, event_buffer_size: usize) -> Self {
        let (events_tx, _unused_rx) = broadcast::channel(event_buffer_size);
        let metrics = Metrics::new();

        Self {
            registry: RequestRegistry::new(store, events_tx, metrics.clone()),
            metrics,
        }
    }
}
