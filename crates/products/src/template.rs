use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oneclick_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use oneclick_events::{Command, Event};

use crate::category::CategoryId;
use crate::price::Price;
use crate::uom::UomRef;

/// Aggregate type name used for template streams.
pub const TEMPLATE_AGGREGATE_TYPE: &str = "products.template";

/// Template identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(pub AggregateId);

impl TemplateId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for TemplateId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    #[default]
    Goods,
    Assets,
    Service,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostPriceMethod {
    #[default]
    Fixed,
    Average,
}

/// The unit-of-measure fields of a template.
///
/// Forms that edit these fields call [`TemplateUoms::on_change_default_uom`] instead of
/// re-implementing the defaulting rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateUoms {
    pub default_uom: Option<UomRef>,
    pub salable: bool,
    pub sale_uom: Option<UomRef>,
    pub purchasable: bool,
    pub purchase_uom: Option<UomRef>,
}

impl TemplateUoms {
    /// Re-derive sale and purchase units after the default unit changed.
    ///
    /// A sale (purchase) unit that is empty or belongs to another category than the new
    /// default unit is replaced by the default unit. Units of the right category are kept.
    pub fn on_change_default_uom(&mut self) {
        let Some(default_uom) = self.default_uom else {
            return;
        };
        self.sale_uom = Some(follow_default(default_uom, self.sale_uom));
        self.purchase_uom = Some(follow_default(default_uom, self.purchase_uom));
    }
}

fn follow_default(default_uom: UomRef, current: Option<UomRef>) -> UomRef {
    match current {
        Some(uom) if uom.category == default_uom.category => uom,
        _ => default_uom,
    }
}

/// Aggregate root: Template (shared catalog attributes of a product).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    id: TemplateId,
    tenant_id: Option<TenantId>,
    name: String,
    product_type: ProductType,
    category: Option<CategoryId>,
    list_price: Price,
    cost_price: Price,
    cost_price_method: CostPriceMethod,
    account_category: bool,
    uoms: TemplateUoms,
    version: u64,
    created: bool,
}

impl Template {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: TemplateId) -> Self {
        Self {
            id,
            tenant_id: None,
            name: String::new(),
            product_type: ProductType::Goods,
            category: None,
            list_price: Price::ZERO,
            cost_price: Price::ZERO,
            cost_price_method: CostPriceMethod::Fixed,
            account_category: false,
            uoms: TemplateUoms::default(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> TemplateId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn product_type(&self) -> ProductType {
        self.product_type
    }

    pub fn category(&self) -> Option<CategoryId> {
        self.category
    }

    pub fn list_price(&self) -> Price {
        self.list_price
    }

    pub fn cost_price(&self) -> Price {
        self.cost_price
    }

    pub fn cost_price_method(&self) -> CostPriceMethod {
        self.cost_price_method
    }

    pub fn account_category(&self) -> bool {
        self.account_category
    }

    pub fn uoms(&self) -> &TemplateUoms {
        &self.uoms
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Template {
    type Id = TemplateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateTemplate.
///
/// `sale_uom` is only meaningful with `salable`, `purchase_uom` only with `purchasable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub tenant_id: TenantId,
    pub template_id: TemplateId,
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
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateCommand {
    CreateTemplate(CreateTemplate),
}

impl Command for TemplateCommand {
    fn tenant_id(&self) -> TenantId {
        match self {
            TemplateCommand::CreateTemplate(cmd) => cmd.tenant_id,
        }
    }

    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            TemplateCommand::CreateTemplate(cmd) => cmd.template_id.0,
        }
    }
}

/// Event: TemplateCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateCreated {
    pub tenant_id: TenantId,
    pub template_id: TemplateId,
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
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateEvent {
    TemplateCreated(TemplateCreated),
}

impl Event for TemplateEvent {
    fn event_type(&self) -> &'static str {
        match self {
            TemplateEvent::TemplateCreated(_) => "products.template.created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            TemplateEvent::TemplateCreated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Template {
    type Command = TemplateCommand;
    type Event = TemplateEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            TemplateEvent::TemplateCreated(e) => {
                self.id = e.template_id;
                self.tenant_id = Some(e.tenant_id);
                self.name = e.name.clone();
                self.product_type = e.product_type;
                self.category = e.category;
                self.list_price = e.list_price;
                self.cost_price = e.cost_price;
                self.cost_price_method = e.cost_price_method;
                self.account_category = e.account_category;
                self.uoms = TemplateUoms {
                    default_uom: Some(e.default_uom),
                    salable: e.salable,
                    sale_uom: e.sale_uom,
                    purchasable: e.purchasable,
                    purchase_uom: e.purchase_uom,
                };
                self.created = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            TemplateCommand::CreateTemplate(cmd) => self.handle_create(cmd),
        }
    }
}

impl Template {
    fn handle_create(&self, cmd: &CreateTemplate) -> Result<Vec<TemplateEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("template already exists"));
        }
        if self.id != cmd.template_id {
            return Err(DomainError::invariant("template_id mismatch"));
        }

        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if cmd.list_price.is_negative() || cmd.cost_price.is_negative() {
            return Err(DomainError::validation("prices cannot be negative"));
        }

        check_unit("sale_uom", cmd.salable, cmd.sale_uom, cmd.default_uom)?;
        check_unit("purchase_uom", cmd.purchasable, cmd.purchase_uom, cmd.default_uom)?;

        Ok(vec![TemplateEvent::TemplateCreated(TemplateCreated {
            tenant_id: cmd.tenant_id,
            template_id: cmd.template_id,
            name: cmd.name.clone(),
            product_type: cmd.product_type,
            category: cmd.category,
            list_price: cmd.list_price,
            cost_price: cmd.cost_price,
            cost_price_method: cmd.cost_price_method,
            default_uom: cmd.default_uom,
            account_category: cmd.account_category,
            salable: cmd.salable,
            sale_uom: cmd.sale_uom,
            purchasable: cmd.purchasable,
            purchase_uom: cmd.purchase_uom,
            occurred_at: cmd.occurred_at,
        })])
    }
}

/// A sale/purchase unit exists exactly when its flag is set, and shares the
/// default unit's category.
fn check_unit(
    field: &str,
    enabled: bool,
    uom: Option<UomRef>,
    default_uom: UomRef,
) -> Result<(), DomainError> {
    match (enabled, uom) {
        (false, Some(_)) => Err(DomainError::invariant(format!(
            "{field} set on a template that does not enable it"
        ))),
        (true, None) => Err(DomainError::validation(format!("{field} is required"))),
        (true, Some(u)) if u.category != default_uom.category => Err(DomainError::invariant(
            format!("{field} must belong to the category of the default unit"),
        )),
        _ => Ok(()),
    }
}
