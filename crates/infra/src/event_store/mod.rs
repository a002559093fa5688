//! Append-only event store boundary.
//!
//! Tenant-scoped event streams behind the [`EventStore`] trait, with an in-memory
//! backend for tests/dev and a Postgres backend for persistent deployments.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryEventStore;
pub use postgres::PostgresEventStore;
pub use r#trait::{AppendBatch, EventStore, EventStoreError, StoredEvent, UncommittedEvent};
