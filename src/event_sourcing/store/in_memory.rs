use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};
use super::event_store::{EventStore, EventStoreError};

/// In-memory event store, keyed by aggregate id.
///
/// The version check and the append happen under a single write lock, so
/// appends and reads for one aggregate are linearizable within the process.
/// Nothing survives a restart.
#[derive(Clone)]
pub struct InMemoryEventStore<E> {
    streams: Arc<RwLock<HashMap<Uuid, Vec<EventEnvelope<E>>>>>,
    aggregate_type_name: String, // e.g., "Payment"
}

impl<E> InMemoryEventStore<E> {
    pub fn new(aggregate_type_name: &str) -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
            aggregate_type_name: aggregate_type_name.to_string(),
        }
    }
}

#[async_trait]
impl<E: DomainEvent> EventStore<E> for InMemoryEventStore<E> {
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, EventStoreError> {
        if events.is_empty() {
            return Err(EventStoreError::EmptyAppend);
        }

        if let Some(foreign) = events.iter().find(|e| e.aggregate_id != aggregate_id) {
            return Err(EventStoreError::AggregateMismatch {
                expected: aggregate_id,
                found: foreign.aggregate_id,
            });
        }

        let mut streams = self.streams.write().await;

        // Check optimistic concurrency
        let current_version = streams.get(&aggregate_id).map_or(0, |s| s.len() as i64);
        if current_version != expected_version {
            tracing::warn!(
                aggregate_id = %aggregate_id,
                aggregate_type = %self.aggregate_type_name,
                expected_version,
                current_version,
                "Rejected append: concurrency conflict"
            );
            return Err(EventStoreError::ConcurrencyConflict {
                aggregate_id,
                expected: expected_version,
                actual: current_version,
            });
        }

        let event_count = events.len();
        let stream = streams.entry(aggregate_id).or_default();
        stream.extend(events);
        let new_version = stream.len() as i64;

        tracing::info!(
            aggregate_id = %aggregate_id,
            aggregate_type = %self.aggregate_type_name,
            new_version,
            event_count,
            "Appended events to event store"
        );

        Ok(new_version)
    }

    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, EventStoreError> {
        let streams = self.streams.read().await;
        let events = streams.get(&aggregate_id).cloned().unwrap_or_default();

        tracing::debug!("Loaded {} events for aggregate {}", events.len(), aggregate_id);
        Ok(events)
    }

    async fn current_version(&self, aggregate_id: Uuid) -> Result<i64, EventStoreError> {
        let streams = self.streams.read().await;
        Ok(streams.get(&aggregate_id).map_or(0, |s| s.len() as i64))
    }
}
