use axum::{Router, routing::get};

pub mod oneclick;
pub mod products;
pub mod reference;
pub mod system;
pub mod templates;

/// Router for all tenant-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/products", products::router().merge(oneclick::router()))
        .nest("/templates", templates::router())
        .route("/uoms", get(reference::list_uoms))
        .route("/uoms/categories", get(reference::list_uom_categories))
        .route("/categories", get(reference::list_categories))
}
