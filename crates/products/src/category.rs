//! Product categories (reference data).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use oneclick_core::{DomainError, DomainResult, Entity};

use crate::reference_id;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub Uuid);

impl core::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A product category. `accounting` marks categories that carry accounting setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCategory {
    pub id: CategoryId,
    pub name: String,
    pub accounting: bool,
}

impl Entity for ProductCategory {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

const STANDARD_CATEGORIES: [(&str, bool); 4] = [
    ("All Products", true),
    ("Services", true),
    ("Raw Materials", true),
    ("Consumables", false),
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryCatalog {
    categories: Vec<ProductCategory>,
}

impl CategoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category. Names are unique; the id derives from the name.
    pub fn add(&mut self, name: impl Into<String>, accounting: bool) -> DomainResult<CategoryId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }
        if self.by_name(&name).is_some() {
            return Err(DomainError::conflict(format!(
                "category '{name}' already registered"
            )));
        }
        Ok(self.push(name, accounting))
    }

    fn push(&mut self, name: String, accounting: bool) -> CategoryId {
        let id = CategoryId(reference_id("product-category", &name));
        self.categories.push(ProductCategory {
            id,
            name,
            accounting,
        });
        id
    }

    pub fn standard() -> Self {
        let mut catalog = Self::new();
        for (name, accounting) in STANDARD_CATEGORIES {
            catalog.push(name.to_string(), accounting);
        }
        catalog
    }

    pub fn get(&self, id: CategoryId) -> Option<&ProductCategory> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn by_name(&self, name: &str) -> Option<&ProductCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn list(&self) -> &[ProductCategory] {
        &self.categories
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_catalog_is_searchable_by_name() {
        let catalog = CategoryCatalog::standard();
        let all = catalog.by_name("All Products").unwrap();
        assert!(all.accounting);
        assert_eq!(catalog.get(all.id).unwrap().name, "All Products");
        assert!(catalog.by_name("Nope").is_none());
    }

    #[test]
    fn add_rejects_blank_name() {
        let mut catalog = CategoryCatalog::new();
        assert!(matches!(catalog.add("  ", false), Err(DomainError::Validation(_))));
    }

    #[test]
    fn standard_ids_are_stable_across_catalogs() {
        let first = CategoryCatalog::standard();
        let second = CategoryCatalog::standard();
        assert_eq!(first.list().len(), 4);
        assert_eq!(first, second);
    }

    #[test]
    fn add_rejects_duplicate_name() {
        let mut catalog = CategoryCatalog::standard();
        let err = catalog.add("Services", false).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
