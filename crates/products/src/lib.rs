//! Product catalog domain (event-sourced).
//!
//! Templates, their product variants, the reference data they point at (units of
//! measure, categories) and the one-click creation form. Pure domain logic: no IO,
//! no HTTP, no storage.

pub mod category;
pub mod oneclick;
pub mod price;
pub mod product;
pub mod template;
pub mod uom;

use uuid::Uuid;

pub use category::{CategoryCatalog, CategoryId, ProductCategory};
pub use price::{DEFAULT_PRICE_DIGITS, PRICE_PRECISION, Price, PriceDigits};
pub use product::{
    CreateProduct, PRODUCT_AGGREGATE_TYPE, Product, ProductCommand, ProductCreated, ProductEvent,
    ProductId, rec_name,
};
pub use template::{
    CostPriceMethod, CreateTemplate, ProductType, TEMPLATE_AGGREGATE_TYPE, Template,
    TemplateCommand, TemplateCreated, TemplateEvent, TemplateId, TemplateUoms,
};
pub use uom::{Uom, UomCatalog, UomCategory, UomCategoryId, UomId, UomRef};

const REFERENCE_NAMESPACE: Uuid = Uuid::from_u128(0x5d0e_8c7a_41b3_4f62_9a1e_c3b7_0f24_d981);

/// Id of a reference-data row (unit, unit category, product category), derived from
/// its kind and natural key so every process agrees on it.
pub(crate) fn reference_id(kind: &str, key: &str) -> Uuid {
    Uuid::new_v5(&REFERENCE_NAMESPACE, format!("{kind}:{key}").as_bytes())
}
