//! Units of measure and their categories.
//!
//! Units are grouped into categories; only units of the same category are
//! interchangeable for a given product (you cannot sell by the kilogram something
//! stocked by the meter).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oneclick_core::{DomainError, DomainResult, Entity, ValueObject};

use crate::reference_id;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UomCategoryId(pub Uuid);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UomId(pub Uuid);

impl core::fmt::Display for UomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Display for UomCategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UomCategory {
    pub id: UomCategoryId,
    pub name: String,
}

/// A unit of measure.
///
/// `rate` converts one of this unit into the category's reference unit
/// (1 kg = 1000 g when the reference is the gram).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uom {
    pub id: UomId,
    pub name: String,
    pub symbol: String,
    pub category: UomCategoryId,
    pub rate: Decimal,
    pub rounding: Decimal,
    pub digits: u32,
}

impl Uom {
    pub fn reference(&self) -> UomRef {
        UomRef {
            id: self.id,
            category: self.category,
        }
    }
}

impl Entity for Uom {
    type Id = UomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A unit reference as stored on catalog records: the unit plus the category it
/// belonged to when the record was written.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UomRef {
    pub id: UomId,
    pub category: UomCategoryId,
}

impl ValueObject for UomRef {}

/// Unit name, symbol, rate as `(mantissa, scale)` and display digits, per category.
type SeedUnit = (&'static str, &'static str, (i64, u32), u32);

const STANDARD_UNITS: [(&str, &[SeedUnit]); 6] = [
    ("Units", &[("Unit", "u", (1, 0), 0), ("Dozen", "dz", (12, 0), 0)]),
    (
        "Weight",
        &[
            ("Gram", "g", (1, 0), 2),
            ("Kilogram", "kg", (1000, 0), 2),
            ("Carat", "c", (2, 1), 2),
            ("Pound", "lb", (45359237, 5), 2),
            ("Ounce", "oz", (28349523125, 9), 2),
        ],
    ),
    (
        "Time",
        &[
            ("Second", "s", (1, 0), 0),
            ("Minute", "min", (60, 0), 2),
            ("Hour", "h", (3600, 0), 2),
            ("Work Day", "wd", (28800, 0), 2),
            ("Day", "d", (86400, 0), 2),
        ],
    ),
    (
        "Length",
        &[
            ("Millimeter", "mm", (1, 3), 2),
            ("Centimeter", "cm", (1, 2), 2),
            ("Meter", "m", (1, 0), 2),
            ("Kilometer", "km", (1000, 0), 2),
            ("Inch", "in", (254, 4), 2),
            ("Foot", "ft", (3048, 4), 2),
        ],
    ),
    ("Surface", &[("Square meter", "m²", (1, 0), 2)]),
    ("Volume", &[("Liter", "l", (1, 0), 2), ("Cubic meter", "m³", (1000, 0), 2)]),
];

/// Reference data: unit categories and units.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UomCatalog {
    categories: Vec<UomCategory>,
    uoms: Vec<Uom>,
}

impl UomCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit category. Names are unique across the catalog.
    pub fn add_category(&mut self, name: impl Into<String>) -> DomainResult<UomCategoryId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("unit category name cannot be empty"));
        }
        if self.categories.iter().any(|c| c.name == name) {
            return Err(DomainError::conflict(format!(
                "unit category '{name}' already registered"
            )));
        }
        Ok(self.push_category(name))
    }

    /// Register a unit. Symbols are unique across the catalog.
    pub fn add_uom(
        &mut self,
        name: impl Into<String>,
        symbol: impl Into<String>,
        category: UomCategoryId,
        rate: Decimal,
        digits: u32,
    ) -> DomainResult<UomId> {
        let symbol = symbol.into();
        if self.category(category).is_none() {
            return Err(DomainError::validation(format!(
                "unknown unit category {category}"
            )));
        }
        if self.by_symbol(&symbol).is_some() {
            return Err(DomainError::conflict(format!(
                "unit symbol '{symbol}' already registered"
            )));
        }
        if rate <= Decimal::ZERO {
            return Err(DomainError::validation("unit rate must be positive"));
        }
        Ok(self.push_uom(name.into(), symbol, category, rate, digits))
    }

    fn push_category(&mut self, name: String) -> UomCategoryId {
        let id = UomCategoryId(reference_id("uom-category", &name));
        self.categories.push(UomCategory { id, name });
        id
    }

    fn push_uom(
        &mut self,
        name: String,
        symbol: String,
        category: UomCategoryId,
        rate: Decimal,
        digits: u32,
    ) -> UomId {
        let id = UomId(reference_id("uom", &symbol));
        self.uoms.push(Uom {
            id,
            name,
            symbol,
            category,
            rate,
            rounding: Decimal::new(1, digits),
            digits,
        });
        id
    }

    /// The default set of units shipped with the catalog.
    ///
    /// Ids derive from category names and unit symbols, so catalogs built by different
    /// processes agree and stored references stay resolvable.
    pub fn standard() -> Self {
        let mut catalog = Self::new();

        for (category, units) in STANDARD_UNITS {
            let category = catalog.push_category(category.to_string());
            for &(name, symbol, (mantissa, scale), digits) in units {
                catalog.push_uom(
                    name.to_string(),
                    symbol.to_string(),
                    category,
                    Decimal::new(mantissa, scale),
                    digits,
                );
            }
        }

        catalog
    }

    pub fn get(&self, id: UomId) -> Option<&Uom> {
        self.uoms.iter().find(|u| u.id == id)
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Uom> {
        self.uoms.iter().find(|u| u.symbol == symbol)
    }

    pub fn category(&self, id: UomCategoryId) -> Option<&UomCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn category_of(&self, id: UomId) -> Option<UomCategoryId> {
        self.get(id).map(|u| u.category)
    }

    /// Resolve a unit id into the reference stored on records.
    pub fn resolve(&self, id: UomId) -> DomainResult<UomRef> {
        self.get(id)
            .map(Uom::reference)
            .ok_or_else(|| DomainError::validation(format!("unknown unit of measure {id}")))
    }

    pub fn in_category(&self, category: UomCategoryId) -> impl Iterator<Item = &Uom> {
        self.uoms.iter().filter(move |u| u.category == category)
    }

    pub fn categories(&self) -> &[UomCategory] {
        &self.categories
    }

    pub fn uoms(&self) -> &[Uom] {
        &self.uoms
    }
}
