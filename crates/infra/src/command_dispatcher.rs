//! Command execution pipeline (application-level orchestration).
//!
//! ```text
//! Command
//!   ↓
//! 1. Load events from store (tenant-scoped)
//!   ↓
//! 2. Rehydrate aggregate (apply historical events)
//!   ↓
//! 3. Handle command (pure decision logic, produces events)      ── decide()
//!   ↓
//! 4. Persist events (append-only, optimistic concurrency check) ── persist()
//! ```
//!
//! Callers that write several aggregates atomically run `decide()` for each, then
//! `persist()` all the resulting batches in one call.
//!
//! This module contains no IO itself; it composes infrastructure traits.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use uuid::Uuid;

use oneclick_core::{Aggregate, AggregateId, DomainError, ExpectedVersion, TenantId};
use oneclick_events::Command;

use crate::event_store::{AppendBatch, EventStore, EventStoreError, StoredEvent, UncommittedEvent};

#[derive(Debug, Error)]
pub enum DispatchError {
    /// Optimistic concurrency failure (e.g. stale aggregate version).
    #[error("concurrency conflict: {0}")]
    Concurrency(String),
    /// Tenant isolation violation (cross-tenant or cross-aggregate stream mixing).
    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("not found")]
    NotFound,
    /// Historical payloads could not be read back as the aggregate's event type.
    #[error("failed to deserialize stored event: {0}")]
    Deserialize(String),
    #[error(transparent)]
    Store(EventStoreError),
}

impl From<EventStoreError> for DispatchError {
    fn from(value: EventStoreError) -> Self {
        match &value {
            EventStoreError::Concurrency(msg) => DispatchError::Concurrency(msg.clone()),
            EventStoreError::TenantIsolation(msg) => DispatchError::TenantIsolation(msg.clone()),
            _ => DispatchError::Store(value),
        }
    }
}

impl From<DomainError> for DispatchError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => DispatchError::Validation(msg),
            DomainError::InvariantViolation(msg) => DispatchError::InvariantViolation(msg),
            DomainError::Conflict(msg) => DispatchError::Concurrency(msg),
            DomainError::NotFound => DispatchError::NotFound,
            DomainError::InvalidId(msg) => DispatchError::Validation(msg),
        }
    }
}

/// Reusable command execution engine for event-sourced aggregates.
#[derive(Debug)]
pub struct CommandDispatcher<S> {
    store: S,
}

impl<S> CommandDispatcher<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S> CommandDispatcher<S>
where
    S: EventStore,
{
    /// Load, rehydrate and handle; returns the batch to append without writing it.
    ///
    /// The batch expects the stream at the version it was loaded at, so a concurrent
    /// writer makes the later `persist()` fail with `Concurrency`.
    pub fn decide<A>(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        command: A::Command,
        make_aggregate: impl FnOnce(TenantId, AggregateId) -> A,
    ) -> Result<AppendBatch, DispatchError>
    where
        A: Aggregate<Error = DomainError>,
        A::Command: Command,
        A::Event: oneclick_events::Event + Serialize + DeserializeOwned,
    {
        if command.tenant_id() != tenant_id || command.target_aggregate_id() != aggregate_id {
            return Err(DispatchError::TenantIsolation(format!(
                "command for stream {}/{} dispatched to {tenant_id}/{aggregate_id}",
                command.tenant_id(),
                command.target_aggregate_id()
            )));
        }

        let history = self.store.load_stream(tenant_id, aggregate_id)?;
        validate_loaded_stream(tenant_id, aggregate_id, &history)?;
        let expected = match stream_version(&history) {
            0 => ExpectedVersion::NoStream,
            v => ExpectedVersion::Exact(v),
        };

        let mut aggregate = make_aggregate(tenant_id, aggregate_id);
        apply_history::<A>(&mut aggregate, &history)?;

        let decided = aggregate.handle(&command).map_err(DispatchError::from)?;

        let aggregate_type = aggregate_type.into();
        let uncommitted = decided
            .iter()
            .map(|ev| {
                UncommittedEvent::from_typed(
                    tenant_id,
                    aggregate_id,
                    aggregate_type.clone(),
                    Uuid::now_v7(),
                    ev,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AppendBatch::new(uncommitted, expected))
    }

    /// Append all batches atomically.
    pub fn persist(&self, batches: Vec<AppendBatch>) -> Result<Vec<StoredEvent>, DispatchError> {
        if batches.iter().all(|b| b.events.is_empty()) {
            return Ok(vec![]);
        }
        Ok(self.store.append_all(batches)?)
    }
}

fn stream_version(stream: &[StoredEvent]) -> u64 {
    stream.last().map(|e| e.sequence_number).unwrap_or(0)
}

fn validate_loaded_stream(
    tenant_id: TenantId,
    aggregate_id: AggregateId,
    stream: &[StoredEvent],
) -> Result<(), DispatchError> {
    // A backend returning foreign or out-of-order events is a bug; refuse to rehydrate.
    let mut last = 0u64;
    for (idx, e) in stream.iter().enumerate() {
        if e.tenant_id != tenant_id {
            return Err(DispatchError::TenantIsolation(format!(
                "loaded stream contains wrong tenant_id at index {idx}"
            )));
        }
        if e.aggregate_id != aggregate_id {
            return Err(DispatchError::TenantIsolation(format!(
                "loaded stream contains wrong aggregate_id at index {idx}"
            )));
        }
        if e.sequence_number <= last {
            return Err(DispatchError::Store(EventStoreError::InvalidAppend(format!(
                "non-monotonic sequence_number in loaded stream (last={last}, found={})",
                e.sequence_number
            ))));
        }
        last = e.sequence_number;
    }
    Ok(())
}

fn apply_history<A>(aggregate: &mut A, history: &[StoredEvent]) -> Result<(), DispatchError>
where
    A: Aggregate,
    A::Event: DeserializeOwned,
{
    for stored in history {
        let ev: A::Event = serde_json::from_value(stored.payload.clone())
            .map_err(|e| DispatchError::Deserialize(e.to_string()))?;
        aggregate.apply(&ev);
    }
    Ok(())
}
