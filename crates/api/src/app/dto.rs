use serde::{Deserialize, Serialize};

use oneclick_products::oneclick::{NavigationAction, OneClickInput, ViewDescriptor, WizardState};
use oneclick_products::{ProductId, TemplateId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ProductListQuery {
    /// Encoded action domain, e.g. `[["id","=","0190..."]]`.
    pub domain: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

/// The form as the client should render it.
#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub state: WizardState,
    pub input: OneClickInput,
    pub view: ViewDescriptor,
}

impl FormResponse {
    pub fn new(state: WizardState, input: OneClickInput) -> Self {
        let view = input.view();
        Self { state, input, view }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub state: WizardState,
    pub action: NavigationAction,
    pub template_id: TemplateId,
    pub product_id: ProductId,
    pub events_committed: usize,
}

#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub state: WizardState,
}
