//! Navigation actions and their list-view domains.
//!
//! A domain is a list of `[field, operator, value]` clauses combined with AND, encoded
//! as compact JSON: `[["id","=","0190..."]]`.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use oneclick_core::{DomainError, DomainResult};

use crate::product::ProductId;

/// Action opened after a successful creation.
pub const PRODUCT_FORM_ACTION: &str = "product.act_product_form";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainClause(pub String, pub String, pub JsonValue);

impl DomainClause {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: JsonValue) -> Self {
        Self(field.into(), operator.into(), value)
    }

    pub fn field(&self) -> &str {
        &self.0
    }

    pub fn operator(&self) -> &str {
        &self.1
    }

    pub fn value(&self) -> &JsonValue {
        &self.2
    }

    fn matches(&self, record: &JsonValue) -> DomainResult<bool> {
        let actual = record.get(self.field()).unwrap_or(&JsonValue::Null);
        match self.operator() {
            "=" => Ok(actual == self.value()),
            "!=" => Ok(actual != self.value()),
            "in" | "not in" => {
                let values = self.value().as_array().ok_or_else(|| {
                    DomainError::validation(format!(
                        "operator '{}' expects a list on field '{}'",
                        self.operator(),
                        self.field()
                    ))
                })?;
                let found = values.contains(actual);
                Ok(if self.operator() == "in" { found } else { !found })
            }
            other => Err(DomainError::validation(format!(
                "unsupported domain operator '{other}'"
            ))),
        }
    }
}

/// A list-view filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionDomain(pub Vec<DomainClause>);

impl ActionDomain {
    /// Domain selecting exactly one record by id.
    pub fn id_equals(id: impl core::fmt::Display) -> Self {
        Self(vec![DomainClause::new(
            "id",
            "=",
            JsonValue::String(id.to_string()),
        )])
    }

    pub fn clauses(&self) -> &[DomainClause] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn encode(&self) -> DomainResult<String> {
        serde_json::to_string(self)
            .map_err(|e| DomainError::validation(format!("domain encoding failed: {e}")))
    }

    pub fn decode(encoded: &str) -> DomainResult<Self> {
        serde_json::from_str(encoded)
            .map_err(|e| DomainError::validation(format!("malformed domain: {e}")))
    }

    /// Evaluate the domain against a JSON record (all clauses must hold).
    pub fn matches(&self, record: &JsonValue) -> DomainResult<bool> {
        for clause in &self.0 {
            if !clause.matches(record)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    Tree,
    Form,
}

/// Client-side navigation produced by the `open_` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationAction {
    pub action: String,
    pub name: String,
    pub res_model: String,
    pub view_modes: Vec<ViewMode>,
    pub domain: ActionDomain,
    /// `domain` in its wire encoding.
    pub pyson_domain: String,
}

impl NavigationAction {
    /// Product list restricted to a single product.
    pub fn open_product(product_id: ProductId) -> DomainResult<Self> {
        let domain = ActionDomain::id_equals(product_id);
        let pyson_domain = domain.encode()?;
        Ok(Self {
            action: PRODUCT_FORM_ACTION.to_string(),
            name: "Products".to_string(),
            res_model: "product.product".to_string(),
            view_modes: vec![ViewMode::Tree, ViewMode::Form],
            domain,
            pyson_domain,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oneclick_core::AggregateId;
    use serde_json::json;

    #[test]
    fn open_product_filters_on_single_id() {
        let product_id = ProductId::new(AggregateId::new());
        let action = NavigationAction::open_product(product_id).unwrap();

        assert_eq!(action.domain.clauses().len(), 1);
        let clause = &action.domain.clauses()[0];
        assert_eq!(clause.field(), "id");
        assert_eq!(clause.operator(), "=");
        assert_eq!(clause.value(), &json!(product_id.to_string()));
        assert_eq!(
            action.pyson_domain,
            format!("[[\"id\",\"=\",\"{product_id}\"]]")
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let domain = ActionDomain::id_equals("abc");
        let decoded = ActionDomain::decode(&domain.encode().unwrap()).unwrap();
        assert_eq!(decoded, domain);
        assert!(ActionDomain::decode("not json").is_err());
    }

    #[test]
    fn matches_supports_equality_and_membership() {
        let record = json!({"id": "a", "code": "W-100"});

        assert!(ActionDomain::id_equals("a").matches(&record).unwrap());
        assert!(!ActionDomain::id_equals("b").matches(&record).unwrap());

        let in_domain =
            ActionDomain(vec![DomainClause::new("code", "in", json!(["W-100", "W-200"]))]);
        assert!(in_domain.matches(&record).unwrap());

        let not_in = ActionDomain(vec![DomainClause::new("code", "not in", json!(["W-100"]))]);
        assert!(!not_in.matches(&record).unwrap());

        assert!(ActionDomain::default().matches(&record).unwrap());
    }

    #[test]
    fn matches_rejects_unknown_operator() {
        let domain = ActionDomain(vec![DomainClause::new("id", "ilike", json!("a%"))]);
        assert!(matches!(
            domain.matches(&json!({"id": "a"})),
            Err(DomainError::Validation(_))
        ));
    }
}
