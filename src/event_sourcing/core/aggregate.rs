use uuid::Uuid;

use super::event::{DomainEvent, EventEnvelope};

// ============================================================================
// Aggregate Root Pattern - Event Sourcing Core
// ============================================================================
//
// Key Principles:
// 1. State is derived from events (not stored directly)
// 2. Commands are validated before emitting events
// 3. Events represent facts that have already happened
// 4. Replay goes through the same validated apply path as live commands
//
// This is the GENERIC aggregate trait that works for ANY domain aggregate.
//
// ============================================================================

/// Failures of the replay fold that are independent of the domain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("No events to reconstruct the aggregate from")]
    EmptyHistory,
}

/// Generic Aggregate trait - all event-sourced aggregates implement this
///
/// Type Parameters:
/// - `Event`: The domain event type for this aggregate
/// - `Command`: The command type for this aggregate
/// - `Error`: The error type for business rule violations
pub trait Aggregate: Sized + Send + Sync {
    type Event: DomainEvent;
    type Command;
    type Error: From<ReplayError>;

    /// Create new aggregate from first event
    fn apply_first_event(envelope: &EventEnvelope<Self::Event>) -> Result<Self, Self::Error>;

    /// Validate and apply a subsequent event.
    ///
    /// Must leave `self` untouched when it returns an error.
    fn apply_event(&mut self, envelope: &EventEnvelope<Self::Event>) -> Result<(), Self::Error>;

    /// Handle command and emit events (business logic)
    fn handle_command(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Get aggregate ID
    fn aggregate_id(&self) -> Uuid;

    /// Get current version (sequence number of the last applied event)
    fn version(&self) -> i64;

    /// Load aggregate from event history (reconstruct from events)
    fn load_from_events(events: &[EventEnvelope<Self::Event>]) -> Result<Self, Self::Error> {
        let (first, rest) = events.split_first().ok_or(ReplayError::EmptyHistory)?;

        let mut aggregate = Self::apply_first_event(first)?;

        for envelope in rest {
            aggregate.apply_event(envelope)?;
        }

        Ok(aggregate)
    }
}
