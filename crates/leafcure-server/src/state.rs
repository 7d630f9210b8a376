//! Application state shared by every request handler.

use std::sync::Arc;

use leafcure_core::RemedyService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RemedyService>,
}

impl AppState {
    pub fn new(service: RemedyService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}
