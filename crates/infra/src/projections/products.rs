//! Product catalog projection: templates and their variants, queryable per tenant.
//!
//! Besides serving the product list, this read model answers the duplicate lookups of
//! the one-click form (template by exact name, product by exact code).

use std::collections::HashMap;
use std::sync::RwLock;

use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value as JsonValue;
use thiserror::Error;
use tracing::debug;

use oneclick_core::{AggregateId, TenantId};
use oneclick_events::EventEnvelope;
use oneclick_products::oneclick::{ActionDomain, ExistingRecord};
use oneclick_products::{
    CategoryId, CostPriceMethod, PRODUCT_AGGREGATE_TYPE, ProductEvent, ProductId, ProductType,
    TEMPLATE_AGGREGATE_TYPE, TemplateEvent, TemplateId, UomId, rec_name,
};

use crate::read_model::{InMemoryTenantStore, TenantStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateReadModel {
    pub id: TemplateId,
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub category: Option<CategoryId>,
    pub list_price: Decimal,
    pub cost_price: Decimal,
    pub cost_price_method: CostPriceMethod,
    pub default_uom: UomId,
    pub account_category: bool,
    pub salable: bool,
    pub sale_uom: Option<UomId>,
    pub purchasable: bool,
    pub purchase_uom: Option<UomId>,
}

/// A variant joined with its template, as shown in the product list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductReadModel {
    pub id: ProductId,
    pub template: TemplateId,
    pub code: Option<String>,
    pub description: Option<String>,
    pub rec_name: String,
    /// Template fields; `None` until the template's event has been seen.
    #[serde(flatten)]
    pub template_data: Option<TemplateSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub list_price: Decimal,
    pub cost_price: Decimal,
    pub default_uom: UomId,
    pub salable: bool,
    pub purchasable: bool,
}

impl From<&TemplateReadModel> for TemplateSummary {
    fn from(t: &TemplateReadModel) -> Self {
        Self {
            name: t.name.clone(),
            product_type: t.product_type,
            list_price: t.list_price,
            cost_price: t.cost_price,
            default_uom: t.default_uom,
            salable: t.salable,
            purchasable: t.purchasable,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct CursorKey {
    tenant_id: TenantId,
    aggregate_id: AggregateId,
}

#[derive(Debug, Error)]
pub enum CatalogProjectionError {
    #[error("failed to deserialize catalog event: {0}")]
    Deserialize(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("non-monotonic sequence number (last={last}, found={found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error("invalid domain filter: {0}")]
    Domain(String),
}

/// Catalog projection over the template and product streams.
///
/// Idempotent per stream: an envelope at or below the stream's cursor is ignored, a gap
/// is an error.
#[derive(Debug)]
pub struct CatalogProjection<
    T = InMemoryTenantStore<TemplateId, TemplateReadModel>,
    P = InMemoryTenantStore<ProductId, ProductReadModel>,
>
where
    T: TenantStore<TemplateId, TemplateReadModel>,
    P: TenantStore<ProductId, ProductReadModel>,
{
    templates: T,
    products: P,
    cursors: RwLock<HashMap<CursorKey, u64>>,
}

impl CatalogProjection {
    pub fn in_memory() -> Self {
        Self::new(InMemoryTenantStore::new(), InMemoryTenantStore::new())
    }
}

impl<T, P> CatalogProjection<T, P>
where
    T: TenantStore<TemplateId, TemplateReadModel>,
    P: TenantStore<ProductId, ProductReadModel>,
{
    pub fn new(templates: T, products: P) -> Self {
        Self {
            templates,
            products,
            cursors: RwLock::new(HashMap::new()),
        }
    }

    fn get_cursor(&self, tenant_id: TenantId, aggregate_id: AggregateId) -> u64 {
        match self.cursors.read() {
            Ok(cursors) => *cursors
                .get(&CursorKey {
                    tenant_id,
                    aggregate_id,
                })
                .unwrap_or(&0),
            Err(_) => 0,
        }
    }

    fn update_cursor(&self, tenant_id: TenantId, aggregate_id: AggregateId, sequence_number: u64) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.insert(
                CursorKey {
                    tenant_id,
                    aggregate_id,
                },
                sequence_number,
            );
        }
    }

    fn clear_cursors(&self, tenant_id: TenantId) {
        if let Ok(mut cursors) = self.cursors.write() {
            cursors.retain(|k, _| k.tenant_id != tenant_id);
        }
    }

    pub fn template(
        &self,
        tenant_id: TenantId,
        template_id: &TemplateId,
    ) -> Option<TemplateReadModel> {
        self.templates.get(tenant_id, template_id)
    }

    pub fn product(&self, tenant_id: TenantId, product_id: &ProductId) -> Option<ProductReadModel> {
        self.products.get(tenant_id, product_id)
    }

    pub fn templates(&self, tenant_id: TenantId) -> Vec<TemplateReadModel> {
        self.templates.list(tenant_id)
    }

    /// All products of the tenant, ordered by display name.
    pub fn products(&self, tenant_id: TenantId) -> Vec<ProductReadModel> {
        let mut products = self.products.list(tenant_id);
        products.sort_by(|a, b| {
            a.rec_name
                .cmp(&b.rec_name)
                .then(a.id.0.as_uuid().cmp(b.id.0.as_uuid()))
        });
        products
    }

    /// Products matching an action domain (e.g. the one produced by `open_`).
    pub fn search_products(
        &self,
        tenant_id: TenantId,
        domain: &ActionDomain,
    ) -> Result<Vec<ProductReadModel>, CatalogProjectionError> {
        let mut found = Vec::new();
        for product in self.products(tenant_id) {
            let record = serde_json::to_value(&product)
                .map_err(|e| CatalogProjectionError::Domain(e.to_string()))?;
            if domain
                .matches(&record)
                .map_err(|e| CatalogProjectionError::Domain(e.to_string()))?
            {
                found.push(product);
            }
        }
        Ok(found)
    }

    /// First template with exactly this name.
    pub fn find_template_by_name(
        &self,
        tenant_id: TenantId,
        name: &str,
    ) -> Option<TemplateReadModel> {
        self.templates
            .filter(tenant_id, &|t| t.name == name)
            .into_iter()
            .min_by_key(|t| *t.id.0.as_uuid())
    }

    /// First product with exactly this code.
    pub fn find_product_by_code(
        &self,
        tenant_id: TenantId,
        code: &str,
    ) -> Option<ProductReadModel> {
        self.products
            .filter(tenant_id, &|p| p.code.as_deref() == Some(code))
            .into_iter()
            .min_by_key(|p| *p.id.0.as_uuid())
    }

    /// Duplicate lookup by template name, reported with the code of one of its variants.
    pub fn existing_template(&self, tenant_id: TenantId, name: &str) -> Option<ExistingRecord> {
        let template = self.find_template_by_name(tenant_id, name)?;
        let code = self
            .products
            .filter(tenant_id, &|p| p.template == template.id && p.code.is_some())
            .into_iter()
            .min_by_key(|p| *p.id.0.as_uuid())
            .and_then(|p| p.code);
        Some(ExistingRecord {
            rec_name: template.name,
            code,
        })
    }

    pub fn existing_product(&self, tenant_id: TenantId, code: &str) -> Option<ExistingRecord> {
        self.find_product_by_code(tenant_id, code)
            .map(|p| ExistingRecord {
                rec_name: p.rec_name,
                code: p.code,
            })
    }

    pub fn apply_envelope(
        &self,
        envelope: &EventEnvelope<JsonValue>,
    ) -> Result<(), CatalogProjectionError> {
        let aggregate_type = envelope.aggregate_type();
        if aggregate_type != TEMPLATE_AGGREGATE_TYPE && aggregate_type != PRODUCT_AGGREGATE_TYPE {
            return Ok(());
        }

        let tenant_id = envelope.tenant_id();
        let aggregate_id = envelope.aggregate_id();
        let seq = envelope.sequence_number();

        let last = self.get_cursor(tenant_id, aggregate_id);
        if seq <= last {
            debug!(
                event_type = envelope.event_type().unwrap_or("unknown"),
                sequence_number = seq,
                "catalog projection skipped already applied event"
            );
            return Ok(());
        }
        if seq != last + 1 {
            return Err(CatalogProjectionError::NonMonotonicSequence { last, found: seq });
        }

        if aggregate_type == TEMPLATE_AGGREGATE_TYPE {
            let ev: TemplateEvent = serde_json::from_value(envelope.payload().clone())
                .map_err(|e| CatalogProjectionError::Deserialize(e.to_string()))?;
            self.apply_template(tenant_id, aggregate_id, ev)?;
        } else {
            let ev: ProductEvent = serde_json::from_value(envelope.payload().clone())
                .map_err(|e| CatalogProjectionError::Deserialize(e.to_string()))?;
            self.apply_product(tenant_id, aggregate_id, ev)?;
        }

        self.update_cursor(tenant_id, aggregate_id, seq);
        Ok(())
    }

    fn apply_template(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        ev: TemplateEvent,
    ) -> Result<(), CatalogProjectionError> {
        match ev {
            TemplateEvent::TemplateCreated(e) => {
                check_scope(tenant_id, aggregate_id, e.tenant_id, e.template_id.0)?;
                let rm = TemplateReadModel {
                    id: e.template_id,
                    name: e.name,
                    product_type: e.product_type,
                    category: e.category,
                    list_price: e.list_price.amount(),
                    cost_price: e.cost_price.amount(),
                    cost_price_method: e.cost_price_method,
                    default_uom: e.default_uom.id,
                    account_category: e.account_category,
                    salable: e.salable,
                    sale_uom: e.sale_uom.map(|u| u.id),
                    purchasable: e.purchasable,
                    purchase_uom: e.purchase_uom.map(|u| u.id),
                };

                // Variants seen before their template get the template data now.
                let orphans = self
                    .products
                    .filter(tenant_id, &|p| p.template == rm.id && p.template_data.is_none());
                for mut product in orphans {
                    product.rec_name = rec_name(product.code.as_deref(), &rm.name);
                    product.template_data = Some(TemplateSummary::from(&rm));
                    self.products.upsert(tenant_id, product.id, product);
                }
                self.templates.upsert(tenant_id, e.template_id, rm);
            }
        }
        Ok(())
    }

    fn apply_product(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        ev: ProductEvent,
    ) -> Result<(), CatalogProjectionError> {
        match ev {
            ProductEvent::ProductCreated(e) => {
                check_scope(tenant_id, aggregate_id, e.tenant_id, e.product_id.0)?;
                let template = self.templates.get(tenant_id, &e.template_id);
                let template_name = template.as_ref().map(|t| t.name.as_str()).unwrap_or_default();
                self.products.upsert(
                    tenant_id,
                    e.product_id,
                    ProductReadModel {
                        id: e.product_id,
                        template: e.template_id,
                        rec_name: rec_name(e.code.as_deref(), template_name),
                        code: e.code,
                        description: e.description,
                        template_data: template.as_ref().map(TemplateSummary::from),
                    },
                );
            }
        }
        Ok(())
    }

    /// Replace the tenants' read models with the given committed events, in order.
    pub fn rebuild_from_scratch(
        &self,
        envelopes: impl IntoIterator<Item = EventEnvelope<JsonValue>>,
    ) -> Result<(), CatalogProjectionError> {
        let envs: Vec<_> = envelopes.into_iter().collect();

        let mut tenants = envs.iter().map(|e| e.tenant_id()).collect::<Vec<_>>();
        tenants.sort_by_key(|t| *t.as_uuid().as_bytes());
        tenants.dedup();
        for t in tenants {
            self.templates.clear_tenant(t);
            self.products.clear_tenant(t);
            self.clear_cursors(t);
        }

        for env in &envs {
            self.apply_envelope(env)?;
        }
        Ok(())
    }
}

fn check_scope(
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    event_tenant: TenantId,
    event_aggregate: AggregateId,
) -> Result<(), CatalogProjectionError> {
    if event_tenant != tenant_id {
        return Err(CatalogProjectionError::TenantIsolation(
            "event tenant_id does not match envelope tenant_id".to_string(),
        ));
    }
    if event_aggregate != aggregate_id {
        return Err(CatalogProjectionError::TenantIsolation(
            "event aggregate id does not match envelope aggregate_id".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use oneclick_products::{Price, ProductCreated, TemplateCreated, UomCatalog};
    use uuid::Uuid;

    fn template_envelope(
        tenant_id: TenantId,
        template_id: TemplateId,
        name: &str,
        seq: u64,
    ) -> EventEnvelope<JsonValue> {
        let uoms = UomCatalog::standard();
        let unit = uoms.by_symbol("u").unwrap().reference();
        let ev = TemplateEvent::TemplateCreated(TemplateCreated {
            tenant_id,
            template_id,
            name: name.to_string(),
            product_type: ProductType::Goods,
            category: None,
            list_price: Price::new(Decimal::new(1000, 2)).unwrap(),
            cost_price: Price::ZERO,
            cost_price_method: CostPriceMethod::Fixed,
            default_uom: unit,
            account_category: true,
            salable: true,
            sale_uom: Some(unit),
            purchasable: false,
            purchase_uom: None,
            occurred_at: Utc::now(),
        });
        EventEnvelope::new(
            Uuid::now_v7(),
            tenant_id,
            template_id.0,
            TEMPLATE_AGGREGATE_TYPE,
            seq,
            serde_json::to_value(ev).unwrap(),
        )
    }

    fn product_envelope(
        tenant_id: TenantId,
        product_id: ProductId,
        template_id: TemplateId,
        code: Option<&str>,
    ) -> EventEnvelope<JsonValue> {
        let ev = ProductEvent::ProductCreated(ProductCreated {
            tenant_id,
            product_id,
            template_id,
            code: code.map(str::to_string),
            description: None,
            occurred_at: Utc::now(),
        });
        EventEnvelope::new(
            Uuid::now_v7(),
            tenant_id,
            product_id.0,
            PRODUCT_AGGREGATE_TYPE,
            1,
            serde_json::to_value(ev).unwrap(),
        )
    }

    fn ids() -> (TemplateId, ProductId) {
        (
            TemplateId::new(AggregateId::new()),
            ProductId::new(AggregateId::new()),
        )
    }

    #[test]
    fn product_joins_template_and_builds_rec_name() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, product_id) = ids();

        projection
            .apply_envelope(&template_envelope(tenant_id, template_id, "Widget", 1))
            .unwrap();
        projection
            .apply_envelope(&product_envelope(tenant_id, product_id, template_id, Some("W-1")))
            .unwrap();

        let product = projection.product(tenant_id, &product_id).unwrap();
        assert_eq!(product.rec_name, "[W-1] Widget");
        assert_eq!(product.template_data.unwrap().list_price, Decimal::new(1000, 2));
    }

    #[test]
    fn product_before_template_is_completed_later() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, product_id) = ids();

        projection
            .apply_envelope(&product_envelope(tenant_id, product_id, template_id, None))
            .unwrap();
        assert!(projection.product(tenant_id, &product_id).unwrap().template_data.is_none());

        projection
            .apply_envelope(&template_envelope(tenant_id, template_id, "Widget", 1))
            .unwrap();
        let product = projection.product(tenant_id, &product_id).unwrap();
        assert_eq!(product.rec_name, "Widget");
        assert!(product.template_data.is_some());
    }

    #[test]
    fn redelivery_is_ignored_and_gaps_rejected() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, _) = ids();
        let env = template_envelope(tenant_id, template_id, "Widget", 1);

        projection.apply_envelope(&env).unwrap();
        projection.apply_envelope(&env).unwrap();
        assert_eq!(projection.templates(tenant_id).len(), 1);

        let (other, _) = ids();
        let err = projection
            .apply_envelope(&template_envelope(tenant_id, other, "Gadget", 3))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogProjectionError::NonMonotonicSequence { last: 0, found: 3 }
        ));
    }

    #[test]
    fn lookups_are_exact_and_tenant_scoped() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, product_id) = ids();
        projection
            .apply_envelope(&template_envelope(tenant_id, template_id, "Widget", 1))
            .unwrap();
        projection
            .apply_envelope(&product_envelope(tenant_id, product_id, template_id, Some("W-1")))
            .unwrap();

        assert!(projection.find_template_by_name(tenant_id, "Widget").is_some());
        assert!(projection.find_template_by_name(tenant_id, "widget").is_none());
        assert!(projection.find_product_by_code(tenant_id, "W-1").is_some());
        assert!(projection.find_product_by_code(TenantId::new(), "W-1").is_none());

        assert_eq!(
            projection.existing_template(tenant_id, "Widget"),
            Some(ExistingRecord {
                rec_name: "Widget".to_string(),
                code: Some("W-1".to_string()),
            })
        );
        assert_eq!(
            projection.existing_product(tenant_id, "W-1").unwrap().rec_name,
            "[W-1] Widget"
        );
    }

    #[test]
    fn search_filters_by_action_domain() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, first) = ids();
        let second = ProductId::new(AggregateId::new());
        projection
            .apply_envelope(&template_envelope(tenant_id, template_id, "Widget", 1))
            .unwrap();
        projection
            .apply_envelope(&product_envelope(tenant_id, first, template_id, Some("W-1")))
            .unwrap();
        projection
            .apply_envelope(&product_envelope(tenant_id, second, template_id, Some("W-2")))
            .unwrap();

        let found = projection
            .search_products(tenant_id, &ActionDomain::id_equals(first))
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, first);

        assert_eq!(
            projection
                .search_products(tenant_id, &ActionDomain::default())
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn rebuild_replaces_tenant_state() {
        let projection = CatalogProjection::in_memory();
        let tenant_id = TenantId::new();
        let (template_id, product_id) = ids();
        projection
            .apply_envelope(&template_envelope(tenant_id, template_id, "Stale", 1))
            .unwrap();

        let (fresh, _) = ids();
        projection
            .rebuild_from_scratch(vec![
                template_envelope(tenant_id, fresh, "Widget", 1),
                product_envelope(tenant_id, product_id, fresh, None),
            ])
            .unwrap();

        assert!(projection.find_template_by_name(tenant_id, "Stale").is_none());
        assert_eq!(projection.products(tenant_id).len(), 1);
    }
}
