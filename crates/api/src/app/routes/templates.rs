use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use oneclick_core::AggregateId;
use oneclick_products::TemplateId;

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_templates))
        .route("/:id", get(get_template))
}

pub async fn list_templates(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
) -> axum::response::Response {
    (StatusCode::OK, Json(services.catalog().templates(tenant.tenant_id()))).into_response()
}

pub async fn get_template(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let agg: AggregateId = match id.parse() {
        Ok(v) => v,
        Err(_) => {
            return errors::json_error(
                StatusCode::BAD_REQUEST,
                "invalid_id",
                "invalid template id",
            );
        }
    };

    match services.catalog().template(tenant.tenant_id(), &TemplateId::new(agg)) {
        Some(template) => (StatusCode::OK, Json(template)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "template not found"),
    }
}
