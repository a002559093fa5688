use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use oneclick_core::DomainError;
use oneclick_infra::command_dispatcher::DispatchError;
use oneclick_infra::oneclick::OneClickServiceError;
use oneclick_infra::projections::CatalogProjectionError;
use oneclick_products::oneclick::OneClickError;

pub fn service_error_to_response(err: OneClickServiceError) -> axum::response::Response {
    match err {
        OneClickServiceError::OneClick(e) => oneclick_error_to_response(e),
        OneClickServiceError::Dispatch(e) => dispatch_error_to_response(e),
        OneClickServiceError::Projection(e) => projection_error_to_response(e),
    }
}

pub fn oneclick_error_to_response(err: OneClickError) -> axum::response::Response {
    let status = match &err {
        OneClickError::DuplicateProduct { .. } => StatusCode::CONFLICT,
        OneClickError::InvalidTransition { .. } => StatusCode::CONFLICT,
        OneClickError::Domain(e) => domain_status(e),
    };
    json_error(status, err.code(), err.to_string())
}

fn domain_status(err: &DomainError) -> StatusCode {
    match err {
        DomainError::Validation(_) | DomainError::InvalidId(_) => StatusCode::BAD_REQUEST,
        DomainError::InvariantViolation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
    }
}

pub fn dispatch_error_to_response(err: DispatchError) -> axum::response::Response {
    match err {
        DispatchError::Concurrency(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DispatchError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DispatchError::InvariantViolation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "invariant_violation", msg)
        }
        DispatchError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DispatchError::Deserialize(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "deserialize_error", msg)
        }
        DispatchError::Store(e) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "store_error",
            e.to_string(),
        ),
        DispatchError::TenantIsolation(msg) => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", msg)
        }
    }
}

pub fn projection_error_to_response(err: CatalogProjectionError) -> axum::response::Response {
    match err {
        CatalogProjectionError::Domain(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_domain", msg)
        }
        other => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "projection_error",
            other.to_string(),
        ),
    }
}

pub fn join_error_to_response(err: tokio::task::JoinError) -> axum::response::Response {
    tracing::error!(error = %err, "service task failed");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "service task failed",
    )
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
