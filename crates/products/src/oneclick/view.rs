//! The one-click input form: fields, defaults, reactive rules and validation.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

use oneclick_core::{DomainError, DomainResult};

use crate::category::{CategoryCatalog, CategoryId};
use crate::price::PriceDigits;
use crate::template::{CostPriceMethod, ProductType, TemplateUoms};
use crate::uom::{UomCatalog, UomCategoryId, UomId};

use super::action::{ActionDomain, DomainClause};

/// Model name of the transient form.
pub const VIEW_MODEL: &str = "product.oneclick.view";

/// Transient form state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneClickInput {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub product_type: ProductType,
    pub category: Option<CategoryId>,
    pub list_price: Option<Decimal>,
    pub cost_price: Option<Decimal>,
    pub cost_price_method: CostPriceMethod,
    pub default_uom: Option<UomId>,
    /// Read-only; mirrors the category of `default_uom`.
    pub default_uom_category: Option<UomCategoryId>,
    pub salable: bool,
    pub sale_uom: Option<UomId>,
    pub purchasable: bool,
    pub purchase_uom: Option<UomId>,
}

impl Default for OneClickInput {
    fn default() -> Self {
        Self {
            name: None,
            code: None,
            description: None,
            product_type: ProductType::Goods,
            category: None,
            list_price: None,
            cost_price: None,
            cost_price_method: CostPriceMethod::Fixed,
            default_uom: None,
            default_uom_category: None,
            salable: true,
            sale_uom: None,
            purchasable: true,
            purchase_uom: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub required: bool,
    pub invisible: bool,
    pub readonly: bool,
}

impl FieldState {
    const fn required() -> Self {
        Self {
            required: true,
            invisible: false,
            readonly: false,
        }
    }

    const fn optional() -> Self {
        Self {
            required: false,
            invisible: false,
            readonly: false,
        }
    }
}

/// Visibility of a notebook page of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageState {
    pub id: &'static str,
    pub invisible: bool,
}

/// Everything a client needs to render the form for the current input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDescriptor {
    pub model: &'static str,
    pub fields: BTreeMap<&'static str, FieldState>,
    pub domains: BTreeMap<&'static str, ActionDomain>,
    pub pages: Vec<PageState>,
}

/// Reference data and settings the form is validated against.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub uoms: &'a UomCatalog,
    pub categories: &'a CategoryCatalog,
    pub price_digits: PriceDigits,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl OneClickInput {
    /// Name, ignoring blank input.
    pub fn name(&self) -> Option<&str> {
        non_blank(&self.name)
    }

    /// Code, ignoring blank input.
    pub fn code(&self) -> Option<&str> {
        non_blank(&self.code)
    }

    pub fn description(&self) -> Option<&str> {
        non_blank(&self.description)
    }

    pub fn field_states(&self) -> BTreeMap<&'static str, FieldState> {
        let mut fields = BTreeMap::new();
        for name in ["name", "type", "cost_price_method", "default_uom"] {
            fields.insert(name, FieldState::required());
        }
        for name in ["code", "description", "category", "salable", "purchasable"] {
            fields.insert(name, FieldState::optional());
        }
        fields.insert(
            "default_uom_category",
            FieldState {
                readonly: true,
                ..FieldState::optional()
            },
        );
        fields.insert(
            "list_price",
            FieldState {
                required: self.salable,
                ..FieldState::optional()
            },
        );
        fields.insert(
            "cost_price",
            FieldState {
                required: self.purchasable,
                ..FieldState::optional()
            },
        );
        fields.insert(
            "sale_uom",
            FieldState {
                required: self.salable,
                invisible: !self.salable,
                readonly: false,
            },
        );
        fields.insert(
            "purchase_uom",
            FieldState {
                required: self.purchasable,
                invisible: !self.purchasable,
                readonly: false,
            },
        );
        fields
    }

    /// Selection domains of the sale/purchase unit fields.
    pub fn field_domains(&self) -> BTreeMap<&'static str, ActionDomain> {
        let category = self
            .default_uom_category
            .map(|c| json!(c.to_string()))
            .unwrap_or(serde_json::Value::Null);
        let domain = ActionDomain(vec![DomainClause::new("category", "=", category)]);

        let mut domains = BTreeMap::new();
        domains.insert("sale_uom", domain.clone());
        domains.insert("purchase_uom", domain);
        domains
    }

    pub fn view_attributes(&self) -> Vec<PageState> {
        vec![
            PageState {
                id: "sale",
                invisible: !self.salable,
            },
            PageState {
                id: "purchase",
                invisible: !self.purchasable,
            },
        ]
    }

    pub fn view(&self) -> ViewDescriptor {
        ViewDescriptor {
            model: VIEW_MODEL,
            fields: self.field_states(),
            domains: self.field_domains(),
            pages: self.view_attributes(),
        }
    }

    /// Category of the chosen default unit, if any.
    pub fn on_change_with_default_uom_category(&self, uoms: &UomCatalog) -> Option<UomCategoryId> {
        self.default_uom.and_then(|id| uoms.category_of(id))
    }

    /// React to a new default unit: the template's own defaulting rules decide the
    /// sale and purchase units.
    pub fn on_change_default_uom(&mut self, uoms: &UomCatalog) {
        let resolve = |id: Option<UomId>| id.and_then(|id| uoms.get(id)).map(|u| u.reference());

        let mut template = TemplateUoms {
            default_uom: resolve(self.default_uom),
            salable: self.salable,
            sale_uom: resolve(self.sale_uom),
            purchasable: self.purchasable,
            purchase_uom: resolve(self.purchase_uom),
        };
        template.on_change_default_uom();

        if template.default_uom.is_some() {
            self.sale_uom = template.sale_uom.map(|u| u.id);
            self.purchase_uom = template.purchase_uom.map(|u| u.id);
        }
        self.default_uom_category = self.on_change_with_default_uom_category(uoms);
    }

    /// Field-level validation run before the creation transition.
    pub fn validate(&self, ctx: &ValidationContext<'_>) -> DomainResult<()> {
        if self.name().is_none() {
            return Err(DomainError::validation("name is required"));
        }

        let default_uom = self
            .default_uom
            .ok_or_else(|| DomainError::validation("default_uom is required"))?;
        let default_category = ctx.uoms.resolve(default_uom)?.category;

        if let Some(category) = self.category {
            if ctx.categories.get(category).is_none() {
                return Err(DomainError::validation(format!(
                    "unknown product category {category}"
                )));
            }
        }

        if self.salable {
            if self.list_price.is_none() {
                return Err(DomainError::validation("list_price is required when salable"));
            }
            check_unit_domain(ctx.uoms, "sale_uom", self.sale_uom, default_category)?;
        }
        if self.purchasable {
            if self.cost_price.is_none() {
                return Err(DomainError::validation(
                    "cost_price is required when purchasable",
                ));
            }
            check_unit_domain(ctx.uoms, "purchase_uom", self.purchase_uom, default_category)?;
        }

        for (field, value) in [("list_price", self.list_price), ("cost_price", self.cost_price)] {
            if let Some(value) = value {
                if value.is_sign_negative() && !value.is_zero() {
                    return Err(DomainError::validation(format!("{field} cannot be negative")));
                }
                ctx.price_digits.check(field, value)?;
            }
        }

        Ok(())
    }
}

fn check_unit_domain(
    uoms: &UomCatalog,
    field: &str,
    uom: Option<UomId>,
    category: UomCategoryId,
) -> DomainResult<()> {
    let uom = uom.ok_or_else(|| DomainError::validation(format!("{field} is required")))?;
    if uoms.resolve(uom)?.category != category {
        return Err(DomainError::validation(format!(
            "{field} must be in the category of the default unit"
        )));
    }
    Ok(())
}
