use serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::event_sourcing::core::DomainEvent;
use super::value_objects::Currency;

// ============================================================================
// Payment Events - Domain Events for Payment Aggregate
// ============================================================================

/// Closed set of payment event kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    PaymentInitiated,
    PaymentLinkGenerated,
    ClientRedirectedToProvider,
    PaymentSucceeded,
    PaymentFailed,
    PaymentExpired,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::PaymentInitiated => "payment_initiated",
            EventType::PaymentLinkGenerated => "payment_link_generated",
            EventType::ClientRedirectedToProvider => "client_redirected_to_provider",
            EventType::PaymentSucceeded => "payment_succeeded",
            EventType::PaymentFailed => "payment_failed",
            EventType::PaymentExpired => "payment_expired",
        }
    }
}

/// Payment Event - Union type for all payment events
///
/// Serialized as `{"type": "<event_type>", "payload": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum PaymentEvent {
    PaymentInitiated(PaymentInitiated),
    PaymentLinkGenerated(PaymentLinkGenerated),
    ClientRedirectedToProvider(ClientRedirectedToProvider),
    PaymentSucceeded(PaymentSucceeded),
    PaymentFailed(PaymentFailed),
    PaymentExpired(PaymentExpired),
}

impl PaymentEvent {
    pub fn kind(&self) -> EventType {
        match self {
            PaymentEvent::PaymentInitiated(_) => EventType::PaymentInitiated,
            PaymentEvent::PaymentLinkGenerated(_) => EventType::PaymentLinkGenerated,
            PaymentEvent::ClientRedirectedToProvider(_) => EventType::ClientRedirectedToProvider,
            PaymentEvent::PaymentSucceeded(_) => EventType::PaymentSucceeded,
            PaymentEvent::PaymentFailed(_) => EventType::PaymentFailed,
            PaymentEvent::PaymentExpired(_) => EventType::PaymentExpired,
        }
    }
}

impl DomainEvent for PaymentEvent {
    fn event_type(&self) -> &'static str {
        self.kind().as_str()
    }
}

// ============================================================================
// Individual Event Payloads
// ============================================================================

/// Payment Initiated - Initial event in payment lifecycle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitiated {
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Payment Link Generated - Client can now be sent to the provider
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentLinkGenerated {
    pub link: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct ClientRedirectedToProvider {}

/// Payment Succeeded - Provider confirmed the payment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSucceeded {
    pub transaction_id: Uuid,
}

/// Payment Failed - Provider declined the payment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentFailed {
    pub reason: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct PaymentExpired {}
