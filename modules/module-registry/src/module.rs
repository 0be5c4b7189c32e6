//! Wiring of the registry: storage, service and REST routes.

use std::sync::Arc;

use axum::Router;

use crate::api::rest::{Links, register_routes};
use crate::config::RegistryConfig;
use crate::domain::service::RegistryService;
use crate::domain::store::ModuleStore;
use crate::infra::storage::FsModuleStore;

/// Configuration section name under `modules:`.
pub const MODULE_NAME: &str = "module_registry";

#[derive(Clone)]
pub struct ModuleRegistry {
    service: Arc<RegistryService>,
    links: Arc<Links>,
    body_limit_bytes: usize,
}

impl ModuleRegistry {
    /// Registry backed by the filesystem under `config.storage_dir`.
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        tracing::info!(
            storage_dir = %config.storage_dir.display(),
            public_url = config.public_url.as_ref().map(url::Url::as_str),
            "Initializing module registry"
        );
        let store = Arc::new(FsModuleStore::new(config.storage_dir.clone()));
        Self::with_store(store, config)
    }

    /// Registry over an arbitrary store.
    #[must_use]
    pub fn with_store(store: Arc<dyn ModuleStore>, config: &RegistryConfig) -> Self {
        Self {
            service: Arc::new(RegistryService::new(store)),
            links: Arc::new(Links::new(config.public_url.clone())),
            body_limit_bytes: config.max_upload_size_bytes(),
        }
    }

    /// Router serving every registry endpoint, with a 404 fallback.
    #[must_use]
    pub fn router(&self) -> Router {
        register_routes(
            Router::new(),
            Arc::clone(&self.service),
            Arc::clone(&self.links),
            self.body_limit_bytes,
        )
    }
}
