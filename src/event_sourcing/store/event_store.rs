use async_trait::async_trait;
use uuid::Uuid;

use crate::event_sourcing::core::{DomainEvent, EventEnvelope};

// ============================================================================
// Generic Event Store - Repository for Events
// ============================================================================
//
// This is a GENERIC event store port that works with ANY event type.
//
// Type Parameter:
// - `E`: The domain event type (must implement DomainEvent trait)
//
// Responsibilities:
// 1. Append events per aggregate (append-only, never rewritten)
// 2. Load the ordered event history for an aggregate
// 3. Ensure optimistic concurrency control (expected version check)
//
// The store trusts its caller: business validation lives in the aggregate.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EventStoreError {
    #[error("Concurrency conflict on aggregate {aggregate_id}: expected version {expected}, but current is {actual}")]
    ConcurrencyConflict {
        aggregate_id: Uuid,
        expected: i64,
        actual: i64,
    },

    #[error("Cannot append empty event list")]
    EmptyAppend,

    #[error("Event for aggregate {found} cannot be appended to aggregate {expected}")]
    AggregateMismatch { expected: Uuid, found: Uuid },
}

#[async_trait]
pub trait EventStore<E: DomainEvent>: Send + Sync {
    /// Append events to the end of the aggregate's log.
    ///
    /// Fails with `ConcurrencyConflict` unless the log currently holds exactly
    /// `expected_version` events. Returns the new version.
    async fn append_events(
        &self,
        aggregate_id: Uuid,
        expected_version: i64,
        events: Vec<EventEnvelope<E>>,
    ) -> Result<i64, EventStoreError>;

    /// Load all events for an aggregate, oldest first. Empty when unknown.
    async fn load_events(&self, aggregate_id: Uuid) -> Result<Vec<EventEnvelope<E>>, EventStoreError>;

    /// Get current version of aggregate (0 when it has no events)
    async fn current_version(&self, aggregate_id: Uuid) -> Result<i64, EventStoreError>;

    /// Check if aggregate exists
    async fn aggregate_exists(&self, aggregate_id: Uuid) -> Result<bool, EventStoreError> {
        Ok(self.current_version(aggregate_id).await? > 0)
    }
}
