use thiserror::Error;

use oneclick_core::DomainError;

use super::wizard::WizardState;

/// Message id of the duplicate-product error.
pub const PRODUCT_EXIST: &str = "product_exist";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OneClickError {
    /// A template with the same name, or a product with the same code, already exists.
    /// Carries the conflicting record's display name and code.
    #[error("Product \"{name}\" with code \"{code}\" already exists.")]
    DuplicateProduct { name: String, code: String },

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("cannot go from state '{from}' to '{to}'")]
    InvalidTransition { from: WizardState, to: WizardState },
}

impl OneClickError {
    /// Stable identifier for clients (the message id for user-facing errors).
    pub fn code(&self) -> &'static str {
        match self {
            OneClickError::DuplicateProduct { .. } => PRODUCT_EXIST,
            OneClickError::Domain(DomainError::Validation(_)) => "validation_error",
            OneClickError::Domain(DomainError::InvariantViolation(_)) => "invariant_violation",
            OneClickError::Domain(DomainError::InvalidId(_)) => "invalid_id",
            OneClickError::Domain(DomainError::NotFound) => "not_found",
            OneClickError::Domain(DomainError::Conflict(_)) => "conflict",
            OneClickError::InvalidTransition { .. } => "invalid_transition",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_message_names_record_and_code() {
        let err = OneClickError::DuplicateProduct {
            name: "[W-100] Widget".to_string(),
            code: "W-100".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Product \"[W-100] Widget\" with code \"W-100\" already exists."
        );
        assert_eq!(err.code(), PRODUCT_EXIST);
    }
}
