//! Application state for Spark.
//!
//! Contains the shared state that is passed to all handlers.

use std::sync::Arc;

use spark_llm::{SuggestConfig, SuggestService};
use spark_store::{JournalStore, JsonFilePort};

use crate::{config, Result};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// The journal collection store.
    pub store: Arc<JournalStore>,
    /// AI suggestion service (best-effort, may have no providers).
    pub suggest: Arc<SuggestService>,
}

impl AppState {
    /// Create a new application state, initializing all services from the
    /// global config.
    pub async fn new() -> Result<Self> {
        let config = config::config();

        let port = Arc::new(JsonFilePort::new(&config.storage.data_dir));
        let store = Arc::new(JournalStore::open(port).await?);

        let suggest = Arc::new(SuggestService::new(&SuggestConfig {
            providers: config.llm.providers.clone(),
        }));

        Ok(Self { store, suggest })
    }

    /// Build state from already-constructed services (used by tests).
    pub fn with_services(store: Arc<JournalStore>, suggest: Arc<SuggestService>) -> Self {
        Self { store, suggest }
    }
}
