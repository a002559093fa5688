use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use oneclick_core::{AggregateId, TenantId};

use super::r#trait::{AppendBatch, EventStore, EventStoreError, StoredEvent};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct StreamKey {
    tenant_id: TenantId,
    aggregate_id: AggregateId,
}

#[derive(Debug, Default)]
struct Streams {
    by_key: HashMap<StreamKey, Vec<StoredEvent>>,
    /// Every committed event in commit order.
    log: Vec<StoredEvent>,
}

/// In-memory append-only event store.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: RwLock<Streams>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[StoredEvent]) -> u64 {
        stream.last().map(|e| e.sequence_number).unwrap_or(0)
    }
}

impl EventStore for InMemoryEventStore {
    fn append_all(&self, batches: Vec<AppendBatch>) -> Result<Vec<StoredEvent>, EventStoreError> {
        let mut streams = self
            .streams
            .write()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;

        // Check every batch first; nothing is written unless all pass.
        let mut seen = HashSet::new();
        let mut plan = Vec::with_capacity(batches.len());
        for batch in &batches {
            let Some((tenant_id, aggregate_id, aggregate_type)) = batch.stream()? else {
                continue;
            };
            let key = StreamKey {
                tenant_id,
                aggregate_id,
            };
            if !seen.insert(key) {
                return Err(EventStoreError::InvalidAppend(format!(
                    "stream {aggregate_id} appears in more than one batch"
                )));
            }

            let stream = streams.by_key.get(&key).map(Vec::as_slice).unwrap_or(&[]);
            let current = Self::current_version(stream);
            if !batch.expected_version.matches(current) {
                return Err(EventStoreError::Concurrency(format!(
                    "stream {aggregate_id}: expected {:?}, found {current}",
                    batch.expected_version
                )));
            }
            if let Some(existing) = stream.first() {
                if existing.aggregate_type != aggregate_type {
                    return Err(EventStoreError::AggregateTypeMismatch(format!(
                        "stream aggregate_type is '{}', attempted append with '{}'",
                        existing.aggregate_type, aggregate_type
                    )));
                }
            }
            plan.push((key, current));
        }

        let mut committed = Vec::new();
        let non_empty = batches.into_iter().filter(|b| !b.events.is_empty());
        for ((key, current), batch) in plan.into_iter().zip(non_empty) {
            let stream = streams.by_key.entry(key).or_default();
            let mut next = current + 1;
            for e in batch.events {
                let stored = StoredEvent {
                    event_id: e.event_id,
                    tenant_id: e.tenant_id,
                    aggregate_id: e.aggregate_id,
                    aggregate_type: e.aggregate_type,
                    sequence_number: next,
                    event_type: e.event_type,
                    event_version: e.event_version,
                    occurred_at: e.occurred_at,
                    payload: e.payload,
                };
                next += 1;
                stream.push(stored.clone());
                committed.push(stored);
            }
        }
        streams.log.extend(committed.iter().cloned());

        Ok(committed)
    }

    fn load_stream(
        &self,
        tenant_id: TenantId,
        aggregate_id: AggregateId,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        let key = StreamKey {
            tenant_id,
            aggregate_id,
        };

        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;

        Ok(streams.by_key.get(&key).cloned().unwrap_or_default())
    }

    fn load_all(&self) -> Result<Vec<StoredEvent>, EventStoreError> {
        let streams = self
            .streams
            .read()
            .map_err(|_| EventStoreError::Backend("lock poisoned".to_string()))?;
        Ok(streams.log.clone())
    }
}
