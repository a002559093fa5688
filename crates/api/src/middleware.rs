use axum::{http::StatusCode, middleware::Next, response::Response};

use crate::app::errors::json_error;
use crate::context::TenantContext;

/// Resolve the tenant from `X-Tenant-Id` and attach it to the request; 401 without one.
pub async fn tenant_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let Some(tenant) = TenantContext::from_headers(req.headers()) else {
        tracing::debug!("request rejected: missing or invalid tenant header");
        return json_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "missing or invalid X-Tenant-Id header",
        );
    };

    req.extensions_mut().insert(tenant);

    next.run(req).await
}
