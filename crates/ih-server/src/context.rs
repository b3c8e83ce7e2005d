//! Application context shared by route handlers via axum state.

use std::sync::Arc;

use ih_core::config::Config;
use ih_pipeline::ImageService;
use ih_store::ObjectStore;

#[derive(Clone, Debug)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub service: ImageService,
}

impl AppContext {
    /// Context over the built-in actions and `store`.
    pub fn new(config: Config, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            config: Arc::new(config),
            service: ImageService::with_builtin(store),
        }
    }
}
