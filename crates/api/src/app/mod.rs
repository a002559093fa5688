//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: infrastructure wiring (event store, catalog projection, one-click service)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around already-built services.
pub fn build_router(services: services::AppServices) -> Router {
    let services = Arc::new(services);

    // Tenant-scoped routes: require `X-Tenant-Id`.
    let protected = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn(middleware::tenant_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .layer(ServiceBuilder::new())
}

/// Build the router from configuration (public entrypoint used by `main.rs`).
pub async fn build_app(
    config: &crate::config::ApiConfig,
) -> Result<Router, services::ServicesError> {
    let services = services::build_services(config).await?;
    Ok(build_router(services))
}
