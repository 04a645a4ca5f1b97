use crate::config::{StateBackend, StateConfig};
use crate::error::{AppError, Result};
use crate::state::{EmergencyStore, InMemoryStore, SledStore, UserStore};
use std::sync::Arc;

/// Emergency and account stores sharing one backend
#[derive(Clone)]
pub struct Stores {
    pub emergencies: Arc<dyn EmergencyStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    fn from_backend<S>(store: S) -> Self
    where
        S: EmergencyStore + UserStore + 'static,
    {
        let store = Arc::new(store);
        Self {
            emergencies: store.clone(),
            users: store,
        }
    }
}

/// Create the stores based on configuration
pub fn create_store(config: &StateConfig) -> Result<Stores> {
    match config.backend {
        StateBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = SledStore::new(path)?;
            Ok(Stores::from_backend(store))
        }

        StateBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create in-memory stores (for testing and development)
pub fn create_in_memory_store() -> Stores {
    tracing::info!("Initializing in-memory storage backend");
    Stores::from_backend(InMemoryStore::new())
}
