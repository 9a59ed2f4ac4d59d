use crate::config::Config;
use crate::store::ResponseStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: ResponseStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> Self {
        Self {
            store: ResponseStore::from_config(&config),
            config: Arc::new(config),
        }
    }
}
