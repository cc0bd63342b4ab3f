use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::event_sourcing::core::{Aggregate, EventEnvelope};
use crate::event_sourcing::store::{EventStore, EventStoreError};
use crate::metrics::Metrics;
use crate::utils::{retry_on_transient, IsTransient, RetryConfig};

use super::aggregate::PaymentAggregate;
use super::commands::{PaymentCommand, WebhookStatus};
use super::errors::{ErrorKind, PaymentError};
use super::events::{EventType, PaymentEvent};
use super::value_objects::PaymentStatus;

// ============================================================================
// Payment Command Handler
// ============================================================================
//
// Orchestrates: Load events → Reconstitute → Command → Append → Result
//
// Appends carry the version observed at load time; losing that race is
// retried from a fresh load, so two concurrent commands never both apply
// to the same snapshot.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Payment not found: {0}")]
    NotFound(Uuid),

    #[error(transparent)]
    Domain(#[from] PaymentError),

    #[error(transparent)]
    Store(#[from] EventStoreError),

    #[error("Command produced unexpected event {}", .0.as_str())]
    UnexpectedEvent(EventType),
}

impl CommandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommandError::NotFound(_) => ErrorKind::NotFound,
            CommandError::Domain(e) => e.kind(),
            CommandError::Store(EventStoreError::ConcurrencyConflict { .. }) => ErrorKind::Conflict,
            CommandError::Store(_) | CommandError::UnexpectedEvent(_) => ErrorKind::Internal,
        }
    }
}

impl IsTransient for CommandError {
    fn is_transient(&self) -> bool {
        matches!(self, CommandError::Store(EventStoreError::ConcurrencyConflict { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentCreated {
    pub payment_id: Uuid,
}

/// One entry of a payment's history, in append order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    #[serde(flatten)]
    pub event: PaymentEvent,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn event_type(&self) -> EventType {
        self.event.kind()
    }
}

impl From<EventEnvelope<PaymentEvent>> for HistoryEntry {
    fn from(envelope: EventEnvelope<PaymentEvent>) -> Self {
        Self {
            event: envelope.event_data,
            timestamp: envelope.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentHistory {
    pub payment_id: Uuid,
    pub status: PaymentStatus,
    pub history: Vec<HistoryEntry>,
}

pub struct PaymentCommandHandler {
    event_store: Arc<dyn EventStore<PaymentEvent>>,
    payment_link_domain: String,
    metrics: Arc<Metrics>,
    retry: RetryConfig,
}

impl PaymentCommandHandler {
    pub fn new(
        event_store: Arc<dyn EventStore<PaymentEvent>>,
        payment_link_domain: impl Into<String>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            event_store,
            payment_link_domain: payment_link_domain.into(),
            metrics,
            retry: RetryConfig::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Create a payment and persist its first event
    pub async fn create_payment(
        &self,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<PaymentCreated, CommandError> {
        let started = Instant::now();
        let result = self.try_create(amount, currency, description).await;
        self.record("create", &result, started);
        result
    }

    async fn try_create(
        &self,
        amount: Decimal,
        currency: &str,
        description: Option<String>,
    ) -> Result<PaymentCreated, CommandError> {
        let payment = PaymentAggregate::create(amount, currency, description)?;

        self.event_store
            .append_events(payment.id(), 0, payment.events().to_vec())
            .await?;
        self.metrics.record_event_appended(EventType::PaymentInitiated.as_str());

        tracing::info!(
            payment_id = %payment.id(),
            amount = %payment.amount(),
            currency = %payment.currency(),
            "Payment created"
        );

        Ok(PaymentCreated { payment_id: payment.id() })
    }

    /// Generate the payment link; returns the link
    pub async fn generate_link(&self, payment_id: Uuid) -> Result<String, CommandError> {
        let command = PaymentCommand::GenerateLink {
            base_domain: self.payment_link_domain.clone(),
        };

        let envelope = self.handle(payment_id, command).await?;
        match envelope.event_data {
            PaymentEvent::PaymentLinkGenerated(e) => Ok(e.link),
            other => Err(CommandError::UnexpectedEvent(other.kind())),
        }
    }

    /// Apply a provider notification
    pub async fn handle_webhook(
        &self,
        payment_id: Uuid,
        status: WebhookStatus,
        reason: Option<String>,
    ) -> Result<(), CommandError> {
        self.handle(payment_id, status.into_command(reason)).await?;
        Ok(())
    }

    /// Handle a command against an existing payment and persist the result
    pub async fn handle(
        &self,
        payment_id: Uuid,
        command: PaymentCommand,
    ) -> Result<EventEnvelope<PaymentEvent>, CommandError> {
        let started = Instant::now();
        let command = &command;

        let result = retry_on_transient(&self.retry, move |attempt| {
            self.try_handle(payment_id, command, attempt)
        })
        .await
        .into_result();

        self.record(command.name(), &result, started);
        result
    }

    async fn try_handle(
        &self,
        payment_id: Uuid,
        command: &PaymentCommand,
        attempt: u32,
    ) -> Result<EventEnvelope<PaymentEvent>, CommandError> {
        let events = self.event_store.load_events(payment_id).await?;
        if events.is_empty() {
            return Err(CommandError::NotFound(payment_id));
        }

        let mut payment = PaymentAggregate::load_from_events(&events)?;
        let expected_version = payment.version();

        let envelope = payment.execute(command)?;

        if let Err(e) = self
            .event_store
            .append_events(payment_id, expected_version, vec![envelope.clone()])
            .await
        {
            if matches!(e, EventStoreError::ConcurrencyConflict { .. }) {
                self.metrics.record_conflict();
            }
            return Err(e.into());
        }
        self.metrics.record_event_appended(&envelope.event_type);

        tracing::info!(
            payment_id = %payment_id,
            command = command.name(),
            event_type = %envelope.event_type,
            status = %payment.status(),
            attempt,
            "Payment command applied"
        );

        Ok(envelope)
    }

    /// Full event history of a payment
    pub async fn get_history(&self, payment_id: Uuid) -> Result<PaymentHistory, CommandError> {
        if !self.event_store.aggregate_exists(payment_id).await? {
            return Err(CommandError::NotFound(payment_id));
        }

        let events = self.event_store.load_events(payment_id).await?;
        let payment = PaymentAggregate::load_from_events(&events)?;

        Ok(PaymentHistory {
            payment_id: payment.id(),
            status: payment.status(),
            history: events.into_iter().map(HistoryEntry::from).collect(),
        })
    }

    fn record<T>(&self, command: &str, result: &Result<T, CommandError>, started: Instant) {
        let outcome = match result {
            Ok(_) => "ok",
            Err(e) => {
                tracing::warn!(command, error = %e, kind = e.kind().as_str(), "Payment command rejected");
                e.kind().as_str()
            }
        };
        self.metrics
            .record_command(command, outcome, started.elapsed().as_secs_f64());
    }
}
