//! Reference data the form points at: units of measure and product categories.

use std::sync::Arc;

use axum::{Json, extract::Extension, response::IntoResponse};

use crate::app::services::AppServices;

pub async fn list_uoms(Extension(services): Extension<Arc<AppServices>>) -> impl IntoResponse {
    Json(services.uoms().uoms().to_vec())
}

pub async fn list_uom_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    Json(services.uoms().categories().to_vec())
}

pub async fn list_categories(
    Extension(services): Extension<Arc<AppServices>>,
) -> impl IntoResponse {
    Json(services.categories().list().to_vec())
}
