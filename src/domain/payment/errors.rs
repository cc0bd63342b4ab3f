use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::event_sourcing::core::ReplayError;
use super::value_objects::PaymentStatus;

// ============================================================================
// Payment Business Rule Errors
// ============================================================================

/// Coarse classification callers map to their own signals (HTTP status, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input at creation
    Validation,
    /// No event log for the referenced payment
    NotFound,
    /// Command not allowed in the current status, or an unreplayable log
    InvalidTransition,
    /// Lost an optimistic concurrency race too many times
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidTransition => "invalid_transition",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentError {
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(Decimal),

    #[error("Invalid currency format {0:?}, expected three uppercase letters (e.g. RUB)")]
    InvalidCurrency(String),

    #[error("Payment link was already generated or payment is in an invalid state ({0})")]
    LinkAlreadyGenerated(PaymentStatus),

    #[error("Client can only be redirected after the payment link is generated (status: {0})")]
    LinkNotGenerated(PaymentStatus),

    #[error("Payment can only be completed after client action (status: {0})")]
    ClientActionRequired(PaymentStatus),

    #[error("Payment is already initiated")]
    AlreadyInitiated,

    #[error("First event must be payment_initiated, got {0}")]
    NotInitialized(String),

    #[error("Event belongs to aggregate {found}, not {expected}")]
    ForeignEvent { expected: Uuid, found: Uuid },

    #[error("Event sequence gap: expected {expected}, got {found}")]
    SequenceGap { expected: i64, found: i64 },

    #[error("Event timestamp {found} precedes the previous event at {previous}")]
    TimestampRegression {
        previous: DateTime<Utc>,
        found: DateTime<Utc>,
    },

    #[error("Command must produce exactly one event, got {0}")]
    UnexpectedEventCount(usize),

    #[error(transparent)]
    Replay(#[from] ReplayError),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PaymentError::InvalidAmount(_) | PaymentError::InvalidCurrency(_) => ErrorKind::Validation,
            PaymentError::UnexpectedEventCount(_) => ErrorKind::Internal,
            _ => ErrorKind::InvalidTransition,
        }
    }
}
