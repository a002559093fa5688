use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use oneclick_core::{AggregateId, ExpectedVersion, TenantId};
use std::sync::Arc;

/// An event ready to be appended to a stream (not yet assigned a sequence number).
///
/// ## Event Lifecycle
///
/// 1. **Domain event**: produced by an aggregate's `handle()`
/// 2. **UncommittedEvent**: wrapped with stream metadata (tenant, aggregate id and type)
/// 3. **StoredEvent**: persisted with an assigned `sequence_number`
/// 4. **EventEnvelope**: applied to the catalog projection
///
/// Build one from a typed event with [`UncommittedEvent::from_typed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncommittedEvent {
    pub event_id: Uuid,
    pub tenant_id: TenantId,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

/// A stored event in an append-only stream.
///
/// Sequence numbers are stream-scoped (tenant + aggregate), start at 1 and never have
/// gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub event_id: Uuid,
    pub tenant_id: TenantId,
    pub aggregate_id: AggregateId,
    pub aggregate_type: String,

    /// Monotonically increasing position in the aggregate stream.
    pub sequence_number: u64,

    pub event_type: String,
    pub event_version: u32,
    pub occurred_at: DateTime<Utc>,

    pub payload: JsonValue,
}

impl StoredEvent {
    pub fn stream_version(&self) -> u64 {
        self.sequence_number
    }

    /// Convert a stored event into a tenant-scoped event envelope for publication.
    pub fn to_envelope(&self) -> oneclick_events::EventEnvelope<JsonValue> {
        oneclick_events::EventEnvelope::new(
            self.event_id,
            self.tenant_id,
            self.aggregate_id,
            self.aggregate_type.clone(),
            self.sequence_number,
            self.payload.clone(),
        )
        .with_event_type(self.event_type.clone())
        .with_occurred_at(self.occurred_at)
    }
}

/// Events for one stream together with the version that stream must be at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendBatch {
    pub events: Vec<UncommittedEvent>,
    pub expected_version: ExpectedVersion,
}

impl AppendBatch {
    pub fn new(events: Vec<UncommittedEvent>, expected_version: ExpectedVersion) -> Self {
        Self {
            events,
            expected_version,
        }
    }

    /// `(tenant, aggregate)` of the stream, checking every event targets it.
    pub(crate) fn stream(&self) -> Result<Option<(TenantId, AggregateId, &str)>, EventStoreError> {
        let Some(first) = self.events.first() else {
            return Ok(None);
        };

        for (idx, e) in self.events.iter().enumerate() {
            if e.tenant_id != first.tenant_id {
                return Err(EventStoreError::TenantIsolation(format!(
                    "batch contains multiple tenant_ids (index {idx})"
                )));
            }
            if e.aggregate_id != first.aggregate_id {
                return Err(EventStoreError::InvalidAppend(format!(
                    "batch contains multiple aggregate_ids (index {idx})"
                )));
            }
            if e.aggregate_type != first.aggregate_type {
                return Err(EventStoreError::AggregateTypeMismatch(format!(
                    "batch contains multiple aggregate_types (index {idx})"
                )));
            }
        }

        Ok(Some((
            first.tenant_id,
            first.aggregate_id,
            first.aggregate_type.as_str(),
        )))
    }
}

/// Event store operation error.
///
/// Infrastructure failures (storage, concurrency, isolation), as opposed to domain
/// errors (validation, invariants).
#[derive(Debug, Error)]
pub enum EventStoreError {
    #[error("optimistic concurrency check failed: {0}")]
    Concurrency(String),

    #[error("tenant isolation violation: {0}")]
    TenantIsolation(String),

    #[error("aggregate type mismatch: {0}")]
    AggregateTypeMismatch(String),

    #[error("invalid append: {0}")]
    InvalidAppend(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Append-only, tenant-scoped event store.
///
/// Events live in streams keyed by `(tenant_id, aggregate_id)`, one stream per
/// aggregate instance.
///
/// Implementations must:
/// - reject cross-tenant batches and loads
/// - check `ExpectedVersion` against the current stream version before writing
/// - assign sequence numbers `current + 1, current + 2, ...`
/// - persist a call's events all-or-nothing
pub trait EventStore: Send + Sync {
    /// Append events to a single aggregate stream.
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        self.append_all(vec![AppendBatch::new(events, expected_version)])
    }

    /// Append to several streams at once.
    ///
    /// Every batch's expected version is checked before anything is written; if one
    /// check or write fails, no batch is persisted. Committed events are returned in
    /// batch order.
    fn append_all(&self, batches: Vec<AppendBatch>) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Load the full stream for a tenant + aggregate, ordered by sequence number.
    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError>;

    /// Load every stored event of every tenant (projection rebuilds).
    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError>;
}

impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append(events, expected_version)
    }

    fn append_all(&self, batches: Vec<AppendBatch>) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).append_all(batches)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_stream(tenant_id, aggregate_id)
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        (**self).load_all()
    }
}

impl UncommittedEvent {
    /// Build from a typed domain event, serializing it to the JSON payload.
    pub fn from_typed<E>(
        tenant_id: TenantId,
        aggregate_id: AggregateId,
        aggregate_type: impl Into<String>,
        event_id: Uuid,
        event: &E,
    ) -> Result<Self, EventStoreError>
    where
        E: oneclick_events::Event + Serialize,
    {
        let payload = serde_json::to_value(event).map_err(|e| {
            EventStoreError::InvalidAppend(format!("payload serialization failed: {e}"))
        })?;

        Ok(Self {
            event_id,
            tenant_id,
            aggregate_id,
            aggregate_type: aggregate_type.into(),
            event_type: event.event_type().to_string(),
            event_version: event.version(),
            occurred_at: event.occurred_at(),
            payload,
        })
    }
}
