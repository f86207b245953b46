use crate::store::ProgressStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Requests take the lock for their whole read-modify-write, so the store
/// only ever sees one writer at a time.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<ProgressStore>>,
}

impl AppState {
    pub fn new(store: ProgressStore) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }
}
