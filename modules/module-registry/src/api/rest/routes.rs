use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Router};

use super::handlers;
use super::links::Links;
use crate::domain::service::RegistryService;

pub const DISCOVERY_PATH: &str = "/.well-known/terraform.json";

#[must_use]
pub fn register_routes(
    router: Router,
    service: Arc<RegistryService>,
    links: Arc<Links>,
    body_limit_bytes: usize,
) -> Router {
    router
        // GET /.well-known/terraform.json - service discovery
        .route(DISCOVERY_PATH, get(handlers::discovery))
        // GET /v1/modules/{namespace}/{name}/{system}/versions - list versions
        .route(
            "/v1/modules/{namespace}/{name}/{system}/versions",
            get(handlers::list_versions),
        )
        // GET /v1/modules/{namespace}/{name}/{system}/{version}/download - redirect to archive
        .route(
            "/v1/modules/{namespace}/{name}/{system}/{version}/download",
            get(handlers::download),
        )
        // GET /v1/modules/{namespace}/{name}/{system}/{version}/file.zip - archive bytes
        .route(
            "/v1/modules/{namespace}/{name}/{system}/{version}/file.zip",
            get(handlers::archive_file),
        )
        // POST /v1/modules/{namespace}/{name}/{system}/{version}/upload - publish
        .route(
            "/v1/modules/{namespace}/{name}/{system}/{version}/upload",
            post(handlers::upload).layer(DefaultBodyLimit::max(body_limit_bytes)),
        )
        .fallback(handlers::not_found)
        .method_not_allowed_fallback(handlers::not_found)
        .layer(Extension(service))
        .layer(Extension(links))
}
