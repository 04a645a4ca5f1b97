pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::{auth::AuthService, processing::EmergencyProcessor};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<EmergencyProcessor>,
    pub auth: Arc<AuthService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(processor: Arc<EmergencyProcessor>, auth: Arc<AuthService>) -> Self {
        Self {
            processor,
            auth,
            started_at: Instant::now(),
        }
    }
}
