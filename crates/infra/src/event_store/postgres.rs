//! Postgres-backed event store implementation.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | EventStoreError |
//! |------------|----------------------|-----------------|
//! | Database (unique violation) | `23505` | `Concurrency` |
//! | Database (check constraint violation) | `23514` | `InvalidAppend` |
//! | Database (other) | Any other | `Backend` |
//! | PoolClosed / network / other | N/A | `Backend` |
//!
//! A one-click creation writes a template stream and a product stream; both batches go
//! through [`PostgresEventStore::append_batches`] in a single transaction.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use std::sync::Arc;
use tracing::{Span, instrument};

use oneclick_core::{AggregateId, TenantId};

use super::r#trait::{AppendBatch, EventStore, EventStoreError, StoredEvent};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS events (
    event_id        UUID PRIMARY KEY,
    tenant_id       UUID NOT NULL,
    aggregate_id    UUID NOT NULL,
    aggregate_type  TEXT NOT NULL,
    sequence_number BIGINT NOT NULL CHECK (sequence_number > 0),
    event_type      TEXT NOT NULL,
    event_version   INTEGER NOT NULL,
    occurred_at     TIMESTAMPTZ NOT NULL,
    payload         JSONB NOT NULL,
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    global_position BIGSERIAL,
    UNIQUE (tenant_id, aggregate_id, sequence_number)
)
"#;

/// Postgres-backed append-only event store.
///
/// Every query filters on `tenant_id`. Optimistic concurrency is checked inside the
/// transaction; a concurrent writer that slips in between the check and the insert
/// trips the `(tenant_id, aggregate_id, sequence_number)` unique constraint.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: Arc<PgPool>,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Create the `events` table if it does not exist.
    pub async fn ensure_schema(&self) -> Result<(), EventStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;
        Ok(())
    }

    #[instrument(
        skip(self),
        fields(
            tenant_id = %tenant_id.as_uuid(),
            aggregate_id = %aggregate_id.as_uuid()
        ),
        err
    )]
    pub async fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                event_id,
                tenant_id,
                aggregate_id,
                aggregate_type,
                sequence_number,
                event_type,
                event_version,
                occurred_at,
                payload
            FROM events
            WHERE tenant_id = $1 AND aggregate_id = $2
            ORDER BY sequence_number ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(aggregate_id.as_uuid())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_stream", e))?;

        decode_rows(rows)
    }

    /// All events of all tenants in commit order.
    #[instrument(skip(self), fields(event_count = tracing::field::Empty), err)]
    pub async fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT
                event_id,
                tenant_id,
                aggregate_id,
                aggregate_type,
                sequence_number,
                event_type,
                event_version,
                occurred_at,
                payload
            FROM events
            ORDER BY global_position ASC
            "#,
        )
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_all", e))?;

        let events = decode_rows(rows)?;
        Span::current().record("event_count", events.len());
        Ok(events)
    }

    /// Append several stream batches in one transaction.
    #[instrument(skip(self, batches), fields(batch_count = batches.len()), err)]
    pub async fn append_batches(
        &self,
        batches: Vec<AppendBatch>,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let mut committed = Vec::new();
        for batch in batches {
            match append_batch(&mut tx, batch).await {
                Ok(stored) => committed.extend(stored),
                Err(err) => {
                    tx.rollback()
                        .await
                        .map_err(|e| map_sqlx_error("rollback", e))?;
                    return Err(err);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(committed)
    }
}

async fn append_batch(
    tx: &mut Transaction<'_, Postgres>,
    batch: AppendBatch,
) -> Result<Vec<StoredEvent>, EventStoreError> {
    let Some((tenant_id, aggregate_id, aggregate_type)) = batch.stream()? else {
        return Ok(vec![]);
    };
    let aggregate_type = aggregate_type.to_string();

    let (current_version, existing_type) =
        check_stream_version(tx, tenant_id, aggregate_id).await?;

    if let Some(existing) = existing_type {
        if existing != aggregate_type {
            return Err(EventStoreError::AggregateTypeMismatch(format!(
                "stream aggregate_type is '{existing}', attempted append with '{aggregate_type}'"
            )));
        }
    }
    if !batch.expected_version.matches(current_version) {
        return Err(EventStoreError::Concurrency(format!(
            "stream {aggregate_id}: expected {:?}, found {current_version}",
            batch.expected_version
        )));
    }

    let mut stored_events = Vec::with_capacity(batch.events.len());
    let mut next_sequence = current_version + 1;
    for event in batch.events {
        sqlx::query(
            r#"
            INSERT INTO events (
                event_id,
                tenant_id,
                aggregate_id,
                aggregate_type,
                sequence_number,
                event_type,
                event_version,
                occurred_at,
                payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(event.event_id)
        .bind(tenant_id.as_uuid())
        .bind(aggregate_id.as_uuid())
        .bind(&aggregate_type)
        .bind(next_sequence as i64)
        .bind(&event.event_type)
        .bind(event.event_version as i32)
        .bind(event.occurred_at)
        .bind(&event.payload)
        .execute(&mut **tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EventStoreError::Concurrency(format!(
                    "concurrent append detected: sequence_number {next_sequence} already exists"
                ))
            } else {
                map_sqlx_error("insert_event", e)
            }
        })?;

        stored_events.push(StoredEvent {
            event_id: event.event_id,
            tenant_id: event.tenant_id,
            aggregate_id: event.aggregate_id,
            aggregate_type: event.aggregate_type,
            sequence_number: next_sequence,
            event_type: event.event_type,
            event_version: event.event_version,
            occurred_at: event.occurred_at,
            payload: event.payload,
        });
        next_sequence += 1;
    }

    Ok(stored_events)
}

/// Returns `(current_version, aggregate_type)`; `(0, None)` for a missing stream.
async fn check_stream_version(
    tx: &mut Transaction<'_, Postgres>,
    tenant_id: TenantId,
    aggregate_id: AggregateId,
) -> Result<(u64, Option<String>), EventStoreError> {
    let row = sqlx::query(
        r#"
        SELECT
            COALESCE(MAX(sequence_number), 0) as current_version,
            MAX(aggregate_type) as aggregate_type
        FROM events
        WHERE tenant_id = $1 AND aggregate_id = $2
        "#,
    )
    .bind(tenant_id.as_uuid())
    .bind(aggregate_id.as_uuid())
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| map_sqlx_error("check_stream_version", e))?;

    let current_version: Option<i64> = row
        .try_get("current_version")
        .map_err(|e| EventStoreError::Backend(format!("failed to read current_version: {e}")))?;
    let aggregate_type: Option<String> = row
        .try_get("aggregate_type")
        .map_err(|e| EventStoreError::Backend(format!("failed to read aggregate_type: {e}")))?;

    Ok((current_version.unwrap_or(0) as u64, aggregate_type))
}

fn decode_rows(rows: Vec<sqlx::postgres::PgRow>) -> Result<Vec<StoredEvent>, EventStoreError> {
    rows.iter()
        .map(|row| {
            StoredEventRow::from_row(row)
                .map(StoredEvent::from)
                .map_err(|e| EventStoreError::Backend(format!("failed to decode event row: {e}")))
        })
        .collect()
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> EventStoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => EventStoreError::Concurrency(msg),
                Some("23514") => EventStoreError::InvalidAppend(msg),
                _ => EventStoreError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            EventStoreError::Backend(format!("connection pool closed in {operation}"))
        }
        _ => EventStoreError::Backend(format!("sqlx error in {operation}: {err}")),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}

#[derive(Debug)]
struct StoredEventRow {
    event_id: uuid::Uuid,
    tenant_id: uuid::Uuid,
    aggregate_id: uuid::Uuid,
    aggregate_type: String,
    sequence_number: i64,
    event_type: String,
    event_version: i32,
    occurred_at: DateTime<Utc>,
    payload: serde_json::Value,
}

impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for StoredEventRow {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        Ok(StoredEventRow {
            event_id: row.try_get("event_id")?,
            tenant_id: row.try_get("tenant_id")?,
            aggregate_id: row.try_get("aggregate_id")?,
            aggregate_type: row.try_get("aggregate_type")?,
            sequence_number: row.try_get("sequence_number")?,
            event_type: row.try_get("event_type")?,
            event_version: row.try_get("event_version")?,
            occurred_at: row.try_get("occurred_at")?,
            payload: row.try_get("payload")?,
        })
    }
}

impl From<StoredEventRow> for StoredEvent {
    fn from(row: StoredEventRow) -> Self {
        StoredEvent {
            event_id: row.event_id,
            tenant_id: TenantId::from_uuid(row.tenant_id),
            aggregate_id: AggregateId::from_uuid(row.aggregate_id),
            aggregate_type: row.aggregate_type,
            sequence_number: row.sequence_number as u64,
            event_type: row.event_type,
            event_version: row.event_version as u32,
            occurred_at: row.occurred_at,
            payload: row.payload,
        }
    }
}

fn runtime() -> Result<tokio::runtime::Handle, EventStoreError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        EventStoreError::Backend(
            "PostgresEventStore requires a tokio runtime; call it from a blocking task".to_string(),
        )
    })
}

// The trait is synchronous; callers on the async side run it under `spawn_blocking`.
impl EventStore for PostgresEventStore {
    fn append_all(&self, batches: Vec<AppendBatch>) -> Result<Vec<StoredEvent>, EventStoreError> {
        runtime()?.block_on(self.append_batches(batches))
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        runtime()?.block_on(PostgresEventStore::load_stream(self, tenant_id, aggregate_id))
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        runtime()?.block_on(PostgresEventStore::load_all(self))
    }
}
