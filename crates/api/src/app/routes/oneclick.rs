//! The one-click product form: `view`, its on-change, Create and Cancel.
//!
//! The form is stateless on the server: each call carries the current input.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};

use oneclick_products::oneclick::{OneClickInput, OneClickWizard, WizardState};

use crate::app::{dto, errors};
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/oneclick", get(show_form))
        .route("/oneclick/on_change/default_uom", post(on_change_default_uom))
        .route("/oneclick/create", post(create))
        .route("/oneclick/cancel", post(cancel))
}

/// The `view` state with default input.
pub async fn show_form() -> axum::response::Response {
    let wizard = OneClickWizard::new();
    (
        StatusCode::OK,
        Json(dto::FormResponse::new(wizard.state(), wizard.input().clone())),
    )
        .into_response()
}

pub async fn on_change_default_uom(
    Extension(services): Extension<Arc<AppServices>>,
    Json(input): Json<OneClickInput>,
) -> axum::response::Response {
    let mut wizard = OneClickWizard::with_input(input);
    if let Err(e) = services.on_change_default_uom(&mut wizard) {
        return errors::oneclick_error_to_response(e);
    }

    (
        StatusCode::OK,
        Json(dto::FormResponse::new(wizard.state(), wizard.input().clone())),
    )
        .into_response()
}

/// The Create button: `create_` then `open_`.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<crate::context::TenantContext>,
    Json(input): Json<OneClickInput>,
) -> axum::response::Response {
    let tenant_id = tenant.tenant_id();

    let result = services
        .run(move |service| {
            let mut wizard = OneClickWizard::with_input(input);
            service.create(tenant_id, &mut wizard)
        })
        .await;

    let created = match result {
        Ok(Ok(created)) => created,
        Ok(Err(e)) => return errors::service_error_to_response(e),
        Err(e) => return errors::join_error_to_response(e),
    };

    (
        StatusCode::CREATED,
        Json(dto::CreatedResponse {
            state: WizardState::Open,
            action: created.action,
            template_id: created.template_id,
            product_id: created.product_id,
            events_committed: created.committed.len(),
        }),
    )
        .into_response()
}

pub async fn cancel() -> axum::response::Response {
    let mut wizard = OneClickWizard::new();
    if let Err(e) = wizard.cancel() {
        return errors::oneclick_error_to_response(e);
    }
    (
        StatusCode::OK,
        Json(dto::StateResponse {
            state: wizard.state(),
        }),
    )
        .into_response()
}
