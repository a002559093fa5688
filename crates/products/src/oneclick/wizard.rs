use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oneclick_core::{DomainError, DomainResult, TenantId};

use crate::category::CategoryId;
use crate::price::Price;
use crate::product::{CreateProduct, ProductId};
use crate::template::{CostPriceMethod, CreateTemplate, ProductType, TemplateId};
use crate::uom::{UomCatalog, UomId, UomRef};

use super::action::NavigationAction;
use super::error::OneClickError;
use super::view::OneClickInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardState {
    #[serde(rename = "view")]
    View,
    #[serde(rename = "create_")]
    Create,
    #[serde(rename = "open_")]
    Open,
    #[serde(rename = "end")]
    End,
}

impl WizardState {
    pub fn as_str(self) -> &'static str {
        match self {
            WizardState::View => "view",
            WizardState::Create => "create_",
            WizardState::Open => "open_",
            WizardState::End => "end",
        }
    }
}

impl core::fmt::Display for WizardState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How an existing record is looked up before creating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupKey {
    /// Only a name was entered: any template with that exact name is a duplicate.
    TemplateName(String),
    /// A code was entered: any product with that exact code is a duplicate.
    ProductCode(String),
}

/// Pick the duplicate lookup for the given input. Blank fields count as absent.
pub fn lookup_key(input: &OneClickInput) -> Option<LookupKey> {
    match (input.name(), input.code()) {
        (Some(name), None) => Some(LookupKey::TemplateName(name.to_string())),
        (_, Some(code)) => Some(LookupKey::ProductCode(code.to_string())),
        (None, None) => None,
    }
}

/// A record found by the duplicate lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingRecord {
    pub rec_name: String,
    pub code: Option<String>,
}

impl ExistingRecord {
    pub fn into_error(self) -> OneClickError {
        OneClickError::DuplicateProduct {
            name: self.rec_name,
            code: self.code.unwrap_or_default(),
        }
    }
}

/// Template fields derived from the form.
///
/// Sale fields are carried only when `salable`, purchase fields only when
/// `purchasable`. Missing prices become zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValues {
    pub name: String,
    pub product_type: ProductType,
    pub category: Option<CategoryId>,
    pub list_price: Price,
    pub cost_price: Price,
    pub cost_price_method: CostPriceMethod,
    pub default_uom: UomRef,
    pub account_category: bool,
    pub salable: bool,
    pub sale_uom: Option<UomRef>,
    pub purchasable: bool,
    pub purchase_uom: Option<UomRef>,
}

impl TemplateValues {
    pub fn from_input(input: &OneClickInput, uoms: &UomCatalog) -> DomainResult<Self> {
        let name = input
            .name()
            .ok_or_else(|| DomainError::validation("name is required"))?;
        let default_uom = input
            .default_uom
            .ok_or_else(|| DomainError::validation("default_uom is required"))?;
        let resolve = |id: Option<UomId>| id.map(|id| uoms.resolve(id)).transpose();

        let mut values = Self {
            name: name.to_string(),
            product_type: input.product_type,
            category: input.category,
            list_price: Price::or_zero(input.list_price)?,
            cost_price: Price::or_zero(input.cost_price)?,
            cost_price_method: input.cost_price_method,
            default_uom: uoms.resolve(default_uom)?,
            account_category: true,
            salable: false,
            sale_uom: None,
            purchasable: false,
            purchase_uom: None,
        };
        if input.salable {
            values.salable = true;
            values.sale_uom = resolve(input.sale_uom)?;
        }
        if input.purchasable {
            values.purchasable = true;
            values.purchase_uom = resolve(input.purchase_uom)?;
        }
        Ok(values)
    }

    pub fn into_command(
        self,
        tenant_id: TenantId,
        template_id: TemplateId,
        occurred_at: DateTime<Utc>,
    ) -> CreateTemplate {
        CreateTemplate {
            tenant_id,
            template_id,
            name: self.name,
            product_type: self.product_type,
            category: self.category,
            list_price: self.list_price,
            cost_price: self.cost_price,
            cost_price_method: self.cost_price_method,
            default_uom: self.default_uom,
            account_category: self.account_category,
            salable: self.salable,
            sale_uom: self.sale_uom,
            purchasable: self.purchasable,
            purchase_uom: self.purchase_uom,
            occurred_at,
        }
    }
}

/// Variant fields derived from the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductValues {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl ProductValues {
    pub fn from_input(input: &OneClickInput) -> Self {
        Self {
            code: input.code().map(str::to_string),
            description: input.description().map(str::to_string),
        }
    }

    pub fn into_command(
        self,
        tenant_id: TenantId,
        product_id: ProductId,
        template_id: TemplateId,
        occurred_at: DateTime<Utc>,
    ) -> CreateProduct {
        CreateProduct {
            tenant_id,
            product_id,
            template_id,
            code: self.code,
            description: self.description,
            occurred_at,
        }
    }
}

/// One session of the one-click form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneClickWizard {
    state: WizardState,
    input: OneClickInput,
    created: Option<(TemplateId, ProductId)>,
}

impl Default for OneClickWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl OneClickWizard {
    pub fn new() -> Self {
        Self::with_input(OneClickInput::default())
    }

    pub fn with_input(input: OneClickInput) -> Self {
        Self {
            state: WizardState::View,
            input,
            created: None,
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn input(&self) -> &OneClickInput {
        &self.input
    }

    /// The form is only editable while it is shown.
    pub fn input_mut(&mut self) -> Result<&mut OneClickInput, OneClickError> {
        self.expect_state(WizardState::View, WizardState::View)?;
        Ok(&mut self.input)
    }

    pub fn on_change_default_uom(&mut self, uoms: &UomCatalog) -> Result<(), OneClickError> {
        self.input_mut()?.on_change_default_uom(uoms);
        Ok(())
    }

    /// Cancel button. Nothing is created.
    pub fn cancel(&mut self) -> Result<(), OneClickError> {
        self.transition(WizardState::View, WizardState::End)
    }

    /// Create button.
    pub fn begin_create(&mut self) -> Result<(), OneClickError> {
        self.transition(WizardState::View, WizardState::Create)
    }

    /// The creation failed (duplicate or validation); the form is shown again unchanged.
    pub fn abort_create(&mut self) -> Result<(), OneClickError> {
        self.transition(WizardState::Create, WizardState::View)
    }

    /// Both records were committed.
    pub fn finish_create(
        &mut self,
        template_id: TemplateId,
        product_id: ProductId,
    ) -> Result<(), OneClickError> {
        self.transition(WizardState::Create, WizardState::Open)?;
        self.created = Some((template_id, product_id));
        Ok(())
    }

    /// Produce the navigation to the created product and end the session.
    pub fn open(&mut self) -> Result<NavigationAction, OneClickError> {
        let (_, product_id) = match (self.state, self.created) {
            (WizardState::Open, Some(created)) => created,
            _ => {
                return Err(OneClickError::InvalidTransition {
                    from: self.state,
                    to: WizardState::End,
                });
            }
        };
        let action = NavigationAction::open_product(product_id)?;
        self.state = WizardState::End;
        Ok(action)
    }

    pub fn created(&self) -> Option<(TemplateId, ProductId)> {
        self.created
    }

    fn expect_state(&self, expected: WizardState, to: WizardState) -> Result<(), OneClickError> {
        if self.state != expected {
            return Err(OneClickError::InvalidTransition {
                from: self.state,
                to,
            });
        }
        Ok(())
    }

    fn transition(&mut self, from: WizardState, to: WizardState) -> Result<(), OneClickError> {
        self.expect_state(from, to)?;
        self.state = to;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oneclick_core::AggregateId;
    use rust_decimal::Decimal;

    fn uom(catalog: &UomCatalog, symbol: &str) -> UomId {
        catalog.by_symbol(symbol).unwrap().id
    }

    fn input(catalog: &UomCatalog) -> OneClickInput {
        OneClickInput {
            name: Some("Widget".to_string()),
            code: Some("W-100".to_string()),
            description: Some("Blue".to_string()),
            list_price: Some(Decimal::new(1999, 2)),
            cost_price: None,
            default_uom: Some(uom(catalog, "u")),
            sale_uom: Some(uom(catalog, "u")),
            purchase_uom: Some(uom(catalog, "dz")),
            ..OneClickInput::default()
        }
    }

    fn ids() -> (TemplateId, ProductId) {
        (
            TemplateId::new(AggregateId::new()),
            ProductId::new(AggregateId::new()),
        )
    }

    #[test]
    fn lookup_uses_template_name_only_without_code() {
        let catalog = UomCatalog::standard();
        let mut input = input(&catalog);
        assert_eq!(
            lookup_key(&input),
            Some(LookupKey::ProductCode("W-100".to_string()))
        );

        input.code = Some("  ".to_string());
        assert_eq!(
            lookup_key(&input),
            Some(LookupKey::TemplateName("Widget".to_string()))
        );

        input.name = None;
        input.code = None;
        assert_eq!(lookup_key(&input), None);
    }

    #[test]
    fn existing_record_becomes_duplicate_error() {
        let err = ExistingRecord {
            rec_name: "Widget".to_string(),
            code: None,
        }
        .into_error();
        assert_eq!(err.to_string(), "Product \"Widget\" with code \"\" already exists.");
    }

    #[test]
    fn template_values_default_missing_prices_to_zero() {
        let catalog = UomCatalog::standard();
        let values = TemplateValues::from_input(&input(&catalog), &catalog).unwrap();

        assert_eq!(values.name, "Widget");
        assert_eq!(values.list_price.amount(), Decimal::new(1999, 2));
        assert_eq!(values.cost_price, Price::ZERO);
        assert!(values.account_category);
        assert!(values.salable && values.purchasable);
        assert_eq!(values.purchase_uom.map(|u| u.id), Some(uom(&catalog, "dz")));
    }

    #[test]
    fn template_values_drop_units_of_disabled_sides() {
        let catalog = UomCatalog::standard();
        let mut input = input(&catalog);
        input.salable = false;
        input.purchasable = false;

        let values = TemplateValues::from_input(&input, &catalog).unwrap();
        assert!(!values.salable);
        assert_eq!(values.sale_uom, None);
        assert!(!values.purchasable);
        assert_eq!(values.purchase_uom, None);
    }

    #[test]
    fn template_values_reject_unknown_unit() {
        let catalog = UomCatalog::standard();
        let mut input = input(&catalog);
        input.default_uom = Some(UomId(uuid::Uuid::now_v7()));
        assert!(TemplateValues::from_input(&input, &catalog).is_err());
    }

    #[test]
    fn product_values_ignore_blank_fields() {
        let catalog = UomCatalog::standard();
        let mut input = input(&catalog);
        input.description = Some(String::new());

        let values = ProductValues::from_input(&input);
        assert_eq!(values.code.as_deref(), Some("W-100"));
        assert_eq!(values.description, None);

        let (template_id, product_id) = ids();
        let cmd = values.into_command(TenantId::new(), product_id, template_id, Utc::now());
        assert_eq!(cmd.template_id, template_id);
    }

    #[test]
    fn cancel_ends_without_creating() {
        let mut wizard = OneClickWizard::new();
        wizard.cancel().unwrap();
        assert_eq!(wizard.state(), WizardState::End);
        assert_eq!(wizard.created(), None);
        assert!(wizard.begin_create().is_err());
    }

    #[test]
    fn create_then_open_yields_product_action() {
        let catalog = UomCatalog::standard();
        let mut wizard = OneClickWizard::with_input(input(&catalog));
        let (template_id, product_id) = ids();

        wizard.begin_create().unwrap();
        assert_eq!(wizard.state(), WizardState::Create);
        assert!(wizard.input_mut().is_err());

        wizard.finish_create(template_id, product_id).unwrap();
        assert_eq!(wizard.state(), WizardState::Open);

        let action = wizard.open().unwrap();
        assert_eq!(action, NavigationAction::open_product(product_id).unwrap());
        assert_eq!(wizard.state(), WizardState::End);
        assert_eq!(wizard.created(), Some((template_id, product_id)));
    }

    #[test]
    fn aborted_create_returns_to_form() {
        let catalog = UomCatalog::standard();
        let mut wizard = OneClickWizard::with_input(input(&catalog));
        wizard.begin_create().unwrap();
        wizard.abort_create().unwrap();

        assert_eq!(wizard.state(), WizardState::View);
        assert_eq!(wizard.input(), &input(&catalog));
        wizard.on_change_default_uom(&catalog).unwrap();
    }

    #[test]
    fn open_before_create_is_rejected() {
        let mut wizard = OneClickWizard::new();
        let err = wizard.open().unwrap_err();
        assert_eq!(
            err,
            OneClickError::InvalidTransition {
                from: WizardState::View,
                to: WizardState::End,
            }
        );
        assert_eq!(err.to_string(), "cannot go from state 'view' to 'end'");
    }

    #[test]
    fn state_serializes_to_form_names() {
        assert_eq!(serde_json::to_string(&WizardState::Create).unwrap(), "\"create_\"");
        assert_eq!(WizardState::Open.to_string(), "open_");
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a disabled side never carries a unit into the template.
            #[test]
            fn disabled_sides_never_store_units(
                salable in any::<bool>(),
                purchasable in any::<bool>(),
                sale_idx in 0usize..21,
                purchase_idx in 0usize..21,
            ) {
                let catalog = UomCatalog::standard();
                let all = catalog.uoms();
                let mut input = input(&catalog);
                input.salable = salable;
                input.purchasable = purchasable;
                input.sale_uom = Some(all[sale_idx % all.len()].id);
                input.purchase_uom = Some(all[purchase_idx % all.len()].id);

                let values = TemplateValues::from_input(&input, &catalog).unwrap();
                prop_assert_eq!(values.sale_uom.is_some(), salable);
                prop_assert_eq!(values.purchase_uom.is_some(), purchasable);
                prop_assert_eq!(values.salable, salable);
                prop_assert_eq!(values.purchasable, purchasable);
            }
        }
    }
}
