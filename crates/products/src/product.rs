use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use oneclick_core::{Aggregate, AggregateId, AggregateRoot, DomainError, TenantId};
use oneclick_events::{Command, Event};

use crate::template::TemplateId;

/// Aggregate type name used for product (variant) streams.
pub const PRODUCT_AGGREGATE_TYPE: &str = "products.product";

/// Product identifier (tenant-scoped via `tenant_id` fields in events/commands).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Display name of a variant: `[code] name`, or just the template name without a code.
pub fn rec_name(code: Option<&str>, template_name: &str) -> String {
    match code {
        Some(code) if !code.is_empty() => format!("[{code}] {template_name}"),
        _ => template_name.to_string(),
    }
}

/// Aggregate root: Product (a sellable/purchasable variant of one template).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    tenant_id: Option<TenantId>,
    template_id: Option<TemplateId>,
    code: Option<String>,
    description: Option<String>,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            tenant_id: None,
            template_id: None,
            code: None,
            description: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn tenant_id(&self) -> Option<TenantId> {
        self.tenant_id
    }

    /// The template this variant was created from. Set once, never changed.
    pub fn template_id(&self) -> Option<TemplateId> {
        self.template_id
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub template_id: TemplateId,
    pub code: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
}

impl Command for ProductCommand {
    fn tenant_id(&self) -> TenantId {
        match self {
            ProductCommand::CreateProduct(cmd) => cmd.tenant_id,
        }
    }

    fn target_aggregate_id(&self) -> AggregateId {
        match self {
            ProductCommand::CreateProduct(cmd) => cmd.product_id.0,
        }
    }
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub tenant_id: TenantId,
    pub product_id: ProductId,
    pub template_id: TemplateId,
    pub code: Option<String>,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "products.product.created",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.tenant_id = Some(e.tenant_id);
                self.template_id = Some(e.template_id);
                self.code = e.code.clone();
                self.description = e.description.clone();
                self.created = true;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
        }
    }
}

impl Product {
    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        if self.id != cmd.product_id {
            return Err(DomainError::invariant("product_id mismatch"));
        }

        // Code uniqueness across products needs the catalog read model; it is checked
        // before the command is built. Here we only reject blank codes.
        if matches!(&cmd.code, Some(code) if code.trim().is_empty()) {
            return Err(DomainError::validation("code cannot be blank"));
        }

        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            tenant_id: cmd.tenant_id,
            product_id: cmd.product_id,
            template_id: cmd.template_id,
            code: cmd.code.clone(),
            description: cmd.description.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
