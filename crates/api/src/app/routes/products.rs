use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use oneclick_core::AggregateId;
use oneclick_products::ProductId;
use oneclick_products::oneclick::ActionDomain;

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
}

/// Product list, optionally filtered by an action domain such as the one returned by
/// the one-click `open_` step.
pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Query(query): Query<dto::ProductListQuery>,
) -> axum::response::Response {
    let domain = match query.domain.as_deref() {
        None => ActionDomain::default(),
        Some(encoded) => match ActionDomain::decode(encoded) {
            Ok(d) => d,
            Err(e) => {
                return errors::json_error(
                    StatusCode::BAD_REQUEST,
                    "invalid_domain",
                    e.to_string(),
                );
            }
        },
    };

    match services.catalog().search_products(tenant.tenant_id(), &domain) {
        Ok(products) => (StatusCode::OK, Json(products)).into_response(),
        Err(e) => errors::projection_error_to_response(e),
    }
}

pub async fn get_product(
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
                "invalid product id",
            );
        }
    };

    match services.catalog().product(tenant.tenant_id(), &ProductId::new(agg)) {
        Some(product) => (StatusCode::OK, Json(product)).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "product not found"),
    }
}
