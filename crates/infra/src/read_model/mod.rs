//! Read model storage: tenant-partitioned and rebuildable from the event log.

pub mod tenant_store;

pub use tenant_store::{InMemoryTenantStore, TenantStore};
