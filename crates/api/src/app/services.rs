use std::sync::Arc;

use sqlx::PgPool;
use thiserror::Error;

use oneclick_core::TenantId;
use oneclick_infra::{
    command_dispatcher::CommandDispatcher,
    event_store::{EventStoreError, InMemoryEventStore, PostgresEventStore},
    oneclick::{Created, OneClickService, OneClickServiceError},
    projections::CatalogProjection,
};
use oneclick_products::{
    CategoryCatalog, PriceDigits, UomCatalog,
    oneclick::{OneClickError, OneClickWizard},
};

use crate::config::{ApiConfig, StoreConfig};

type InMemoryService = OneClickService<Arc<InMemoryEventStore>>;

type PersistentService = OneClickService<Arc<PostgresEventStore>>;

#[derive(Debug, Error)]
pub enum ServicesError {
    #[error("failed to connect to Postgres: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("failed to prepare event store schema: {0}")]
    Schema(#[from] EventStoreError),

    #[error("failed to rebuild the catalog: {0}")]
    Rebuild(#[from] OneClickServiceError),

    #[error("startup task failed: {0}")]
    Join(String),
}

/// Services shared by all handlers.
///
/// Service calls are synchronous (the Postgres store blocks on its own queries), so
/// handlers run them through [`AppServices::run`].
#[derive(Clone)]
pub enum AppServices {
    InMemory(Arc<InMemoryService>),
    Persistent(Arc<PersistentService>),
}

pub async fn build_services(config: &ApiConfig) -> Result<AppServices, ServicesError> {
    match &config.store {
        StoreConfig::InMemory => Ok(build_in_memory_services(config.price_digits)),
        StoreConfig::Postgres { database_url } => {
            build_persistent_services(database_url, config.price_digits).await
        }
    }
}

pub fn build_in_memory_services(price_digits: PriceDigits) -> AppServices {
    let store = Arc::new(InMemoryEventStore::new());
    let service = OneClickService::new(
        CommandDispatcher::new(store),
        Arc::new(CatalogProjection::in_memory()),
        Arc::new(UomCatalog::standard()),
        Arc::new(CategoryCatalog::standard()),
        price_digits,
    );
    AppServices::InMemory(Arc::new(service))
}

async fn build_persistent_services(
    database_url: &str,
    price_digits: PriceDigits,
) -> Result<AppServices, ServicesError> {
    let pool = PgPool::connect(database_url).await?;

    let store = Arc::new(PostgresEventStore::new(pool));
    store.ensure_schema().await?;

    let service = Arc::new(OneClickService::new(
        CommandDispatcher::new(store),
        Arc::new(CatalogProjection::in_memory()),
        Arc::new(UomCatalog::standard()),
        Arc::new(CategoryCatalog::standard()),
        price_digits,
    ));

    // The catalog lives in memory: replay the store before serving.
    let replay = service.clone();
    tokio::task::spawn_blocking(move || replay.rebuild_catalog())
        .await
        .map_err(|e| ServicesError::Join(e.to_string()))??;

    Ok(AppServices::Persistent(service))
}

impl AppServices {
    /// Run `f` with the service on the blocking pool.
    pub async fn run<R, F>(&self, f: F) -> Result<R, tokio::task::JoinError>
    where
        R: Send + 'static,
        F: FnOnce(&dyn OneClick) -> R + Send + 'static,
    {
        let services = self.clone();
        tokio::task::spawn_blocking(move || match &services {
            AppServices::InMemory(service) => f(service.as_ref()),
            AppServices::Persistent(service) => f(service.as_ref()),
        })
        .await
    }

    pub fn catalog(&self) -> &CatalogProjection {
        match self {
            AppServices::InMemory(service) => service.catalog(),
            AppServices::Persistent(service) => service.catalog(),
        }
    }

    pub fn uoms(&self) -> &UomCatalog {
        match self {
            AppServices::InMemory(service) => service.uoms(),
            AppServices::Persistent(service) => service.uoms(),
        }
    }

    pub fn categories(&self) -> &CategoryCatalog {
        match self {
            AppServices::InMemory(service) => service.categories(),
            AppServices::Persistent(service) => service.categories(),
        }
    }

    pub fn on_change_default_uom(&self, wizard: &mut OneClickWizard) -> Result<(), OneClickError> {
        match self {
            AppServices::InMemory(service) => service.on_change_default_uom(wizard),
            AppServices::Persistent(service) => service.on_change_default_uom(wizard),
        }
    }
}

/// Store-independent view of a [`OneClickService`].
pub trait OneClick {
    fn create(
        &self,
        tenant_id: TenantId,
        wizard: &mut OneClickWizard,
    ) -> Result<Created, OneClickServiceError>;
}

impl<S> OneClick for OneClickService<S>
where
    S: oneclick_infra::event_store::EventStore,
{
    fn create(
        &self,
        tenant_id: TenantId,
        wizard: &mut OneClickWizard,
    ) -> Result<Created, OneClickServiceError> {
        OneClickService::create(self, tenant_id, wizard)
    }
}
