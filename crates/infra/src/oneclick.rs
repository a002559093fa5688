//! The one-click creation transition: duplicate check, atomic creation of a template and
//! its product, then the navigation action.

use std::sync::{Arc, Mutex};

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};

use oneclick_core::{AggregateId, TenantId};
use oneclick_products::oneclick::{
    ExistingRecord, LookupKey, NavigationAction, OneClickError, OneClickInput, OneClickWizard,
    ProductValues, TemplateValues, ValidationContext, ViewDescriptor, lookup_key,
};
use oneclick_products::{
    CategoryCatalog, PRODUCT_AGGREGATE_TYPE, PriceDigits, Product, ProductCommand, ProductId,
    TEMPLATE_AGGREGATE_TYPE, Template, TemplateCommand, TemplateId, UomCatalog,
};

use crate::command_dispatcher::{CommandDispatcher, DispatchError};
use crate::event_store::{EventStore, StoredEvent};
use crate::projections::{CatalogProjection, CatalogProjectionError};

#[derive(Debug, Error)]
pub enum OneClickServiceError {
    #[error(transparent)]
    OneClick(#[from] OneClickError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Projection(#[from] CatalogProjectionError),
}

/// Outcome of a successful creation.
#[derive(Debug, Clone)]
pub struct Created {
    pub template_id: TemplateId,
    pub product_id: ProductId,
    pub action: NavigationAction,
    pub committed: Vec<StoredEvent>,
}

/// Runs one-click sessions against an event store, keeping the catalog projection
/// current.
pub struct OneClickService<S> {
    dispatcher: CommandDispatcher<S>,
    catalog: Arc<CatalogProjection>,
    uoms: Arc<UomCatalog>,
    categories: Arc<CategoryCatalog>,
    price_digits: PriceDigits,
    /// Serializes duplicate check and commit.
    create_lock: Mutex<()>,
}

impl<S> OneClickService<S>
where
    S: EventStore,
{
    pub fn new(
        dispatcher: CommandDispatcher<S>,
        catalog: Arc<CatalogProjection>,
        uoms: Arc<UomCatalog>,
        categories: Arc<CategoryCatalog>,
        price_digits: PriceDigits,
    ) -> Self {
        Self {
            dispatcher,
            catalog,
            uoms,
            categories,
            price_digits,
            create_lock: Mutex::new(()),
        }
    }

    pub fn catalog(&self) -> &CatalogProjection {
        &self.catalog
    }

    pub fn uoms(&self) -> &UomCatalog {
        &self.uoms
    }

    pub fn categories(&self) -> &CategoryCatalog {
        &self.categories
    }

    pub fn price_digits(&self) -> PriceDigits {
        self.price_digits
    }

    /// A fresh session showing the form with its defaults.
    pub fn start(&self) -> OneClickWizard {
        OneClickWizard::new()
    }

    pub fn view(&self, input: &OneClickInput) -> ViewDescriptor {
        input.view()
    }

    pub fn on_change_default_uom(&self, wizard: &mut OneClickWizard) -> Result<(), OneClickError> {
        wizard.on_change_default_uom(&self.uoms)
    }

    pub fn validate(&self, input: &OneClickInput) -> Result<(), OneClickError> {
        let ctx = ValidationContext {
            uoms: &self.uoms,
            categories: &self.categories,
            price_digits: self.price_digits,
        };
        Ok(input.validate(&ctx)?)
    }

    /// The Create button.
    ///
    /// On success the wizard ends and the returned action opens the new product. On any
    /// failure nothing is persisted and the wizard is back on the form with its input.
    #[instrument(skip(self, wizard), fields(tenant_id = %tenant_id))]
    pub fn create(
        &self,
        tenant_id: TenantId,
        wizard: &mut OneClickWizard,
    ) -> Result<Created, OneClickServiceError> {
        wizard.begin_create()?;

        match self.create_records(tenant_id, wizard.input()) {
            Ok((template_id, product_id, committed)) => {
                wizard.finish_create(template_id, product_id)?;
                let action = wizard.open()?;
                Ok(Created {
                    template_id,
                    product_id,
                    action,
                    committed,
                })
            }
            Err(err) => {
                wizard.abort_create()?;
                Err(err)
            }
        }
    }

    /// Duplicate lookup for the input's key.
    pub fn find_existing(
        &self,
        tenant_id: TenantId,
        input: &OneClickInput,
    ) -> Option<ExistingRecord> {
        match lookup_key(input)? {
            LookupKey::TemplateName(name) => self.catalog.existing_template(tenant_id, &name),
            LookupKey::ProductCode(code) => self.catalog.existing_product(tenant_id, &code),
        }
    }

    fn create_records(
        &self,
        tenant_id: TenantId,
        input: &OneClickInput,
    ) -> Result<(TemplateId, ProductId, Vec<StoredEvent>), OneClickServiceError> {
        self.validate(input)?;

        // Held until the projection reflects the commit, so the next lookup sees it.
        let _guard = self
            .create_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(existing) = self.find_existing(tenant_id, input) {
            warn!(
                rec_name = %existing.rec_name,
                code = existing.code.as_deref().unwrap_or_default(),
                "one-click creation rejected: product exists"
            );
            return Err(existing.into_error().into());
        }

        let template_values =
            TemplateValues::from_input(input, &self.uoms).map_err(OneClickError::from)?;
        let product_values = ProductValues::from_input(input);

        let template_id = TemplateId::new(AggregateId::new());
        let product_id = ProductId::new(AggregateId::new());
        let now = Utc::now();

        let template_batch = self.dispatcher.decide(
            tenant_id,
            template_id.0,
            TEMPLATE_AGGREGATE_TYPE,
            TemplateCommand::CreateTemplate(
                template_values.into_command(tenant_id, template_id, now),
            ),
            |_: TenantId, id: AggregateId| Template::empty(TemplateId::new(id)),
        )?;
        let product_batch = self.dispatcher.decide(
            tenant_id,
            product_id.0,
            PRODUCT_AGGREGATE_TYPE,
            ProductCommand::CreateProduct(product_values.into_command(
                tenant_id,
                product_id,
                template_id,
                now,
            )),
            |_: TenantId, id: AggregateId| Product::empty(ProductId::new(id)),
        )?;

        let committed = self.dispatcher.persist(vec![template_batch, product_batch])?;

        for stored in &committed {
            if let Err(err) = self.catalog.apply_envelope(&stored.to_envelope()) {
                warn!(
                    error = %err,
                    event_id = %stored.event_id,
                    "catalog projection update failed"
                );
            }
        }

        info!(
            template_id = %template_id,
            product_id = %product_id,
            "one-click product created"
        );
        Ok((template_id, product_id, committed))
    }

    /// Rebuild the catalog projection from every stored event.
    #[instrument(skip(self))]
    pub fn rebuild_catalog(&self) -> Result<usize, OneClickServiceError> {
        let events = self
            .dispatcher
            .store()
            .load_all()
            .map_err(DispatchError::from)?;
        let count = events.len();
        self.catalog
            .rebuild_from_scratch(events.iter().map(StoredEvent::to_envelope))?;
        info!(event_count = count, "catalog projection rebuilt");
        Ok(count)
    }
}
