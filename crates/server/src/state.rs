//! Shared application state handed to every axum handler.

use std::sync::Arc;

use sentrywatch_store::Store;
use sentrywatch_supervisor::Supervisor;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub supervisor: Supervisor,
}

impl AppState {
    pub fn new(store: Store, supervisor: Supervisor) -> Self {
        Self {
            store: Arc::new(store),
            supervisor,
        }
    }
}
