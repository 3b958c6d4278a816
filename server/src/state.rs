use std::sync::Arc;

use crate::store::EventStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
}

impl AppState {
    pub fn new(store: EventStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
