//! Startup configuration, read once from environment variables.

use oneclick_products::{DEFAULT_PRICE_DIGITS, PriceDigits};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreConfig {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub price_digits: PriceDigits,
    pub store: StoreConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            price_digits: PriceDigits::default(),
            store: StoreConfig::InMemory,
        }
    }
}

impl ApiConfig {
    /// `PRODUCT_PRICE_DECIMAL`, `BIND_ADDR`, `USE_PERSISTENT_STORES`, `DATABASE_URL`.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let price_digits = match var("PRODUCT_PRICE_DECIMAL") {
            None => PriceDigits::default(),
            Some(raw) => match raw.trim().parse::<u32>().map(PriceDigits::new) {
                Ok(Ok(digits)) => digits,
                Ok(Err(e)) => {
                    tracing::warn!(
                        "PRODUCT_PRICE_DECIMAL rejected ({e}); using {DEFAULT_PRICE_DIGITS}"
                    );
                    PriceDigits::default()
                }
                Err(_) => {
                    tracing::warn!(
                        "PRODUCT_PRICE_DECIMAL={raw:?} is not an integer; \
                         using {DEFAULT_PRICE_DIGITS}"
                    );
                    PriceDigits::default()
                }
            },
        };

        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let use_persistent = var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let store = if use_persistent {
            match var("DATABASE_URL") {
                Some(database_url) => StoreConfig::Postgres { database_url },
                None => {
                    tracing::warn!(
                        "USE_PERSISTENT_STORES=true but DATABASE_URL is not set, \
                         falling back to in-memory"
                    );
                    StoreConfig::InMemory
                }
            }
        } else {
            StoreConfig::InMemory
        };

        Self {
            bind_addr,
            price_digits,
            store,
        }
    }
}
