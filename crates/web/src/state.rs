use std::sync::Arc;

use storage::Registry;

use crate::middleware::auth::ApiKeys;

/// Shared handler state; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<dyn Registry>,
    pub api_keys: ApiKeys,
}

impl AppState {
    pub fn new(registry: Arc<dyn Registry>, api_keys: ApiKeys) -> Self {
        Self { registry, api_keys }
    }
}
