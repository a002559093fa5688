//! One-click product creation.
//!
//! A single form collects template and variant fields together; confirming it creates
//! one [`Template`](crate::template::Template) and one [`Product`](crate::product::Product)
//! referencing it, then opens the product list filtered to the new record.
//!
//! ```text
//! view ──Cancel──▶ end
//!   │
//!   └──Create──▶ create_ ──▶ open_
//!         ▲          │
//!         └─duplicate┘
//! ```
//!
//! This module is pure: duplicate lookups and persistence are done by the caller
//! (see `oneclick-infra`), which feeds the results back through [`OneClickWizard`].

pub mod action;
pub mod error;
pub mod view;
pub mod wizard;

pub use action::{ActionDomain, DomainClause, NavigationAction, ViewMode};
pub use error::{OneClickError, PRODUCT_EXIST};
pub use view::{FieldState, OneClickInput, PageState, ValidationContext, ViewDescriptor};
pub use wizard::{
    ExistingRecord, LookupKey, OneClickWizard, ProductValues, TemplateValues, WizardState,
    lookup_key,
};
