use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::PaymentError;
use super::events::EventType;

// ============================================================================
// Payment Value Objects
// ============================================================================

/// ISO-4217 style currency code: exactly three uppercase ASCII letters.
///
/// Validated on construction and on deserialization, so a replayed
/// `payment_initiated` payload can not smuggle in a malformed code.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn parse(code: &str) -> Result<Self, PaymentError> {
        if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
            Ok(Self(code.to_string()))
        } else {
            Err(PaymentError::InvalidCurrency(code.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Currency {
    type Error = PaymentError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        Self::parse(&code)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Payment lifecycle status, derived by replaying the event log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Created,
    LinkReady,
    ClientRedirected,
    Success,
    Failed,
    /// Reserved for timeout handling; nothing produces it yet.
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::LinkReady => "link_ready",
            PaymentStatus::ClientRedirected => "client_redirected",
            PaymentStatus::Success => "success",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Success | PaymentStatus::Failed | PaymentStatus::Expired
        )
    }

    /// The payment state machine.
    ///
    /// Returns the status reached by applying an event of type `event` in
    /// status `self`, or the reason the event is not allowed. Both live
    /// commands and replay go through here.
    pub fn transition(self, event: EventType) -> Result<PaymentStatus, PaymentError> {
        use PaymentStatus::*;

        match (event, self) {
            (EventType::PaymentInitiated, _) => Err(PaymentError::AlreadyInitiated),

            (EventType::PaymentLinkGenerated, Created) => Ok(LinkReady),
            (EventType::PaymentLinkGenerated, status) => Err(PaymentError::LinkAlreadyGenerated(status)),

            (EventType::ClientRedirectedToProvider, LinkReady) => Ok(ClientRedirected),
            (EventType::ClientRedirectedToProvider, status) => Err(PaymentError::LinkNotGenerated(status)),

            (EventType::PaymentSucceeded, LinkReady | ClientRedirected) => Ok(Success),
            (EventType::PaymentFailed, LinkReady | ClientRedirected) => Ok(Failed),
            (EventType::PaymentSucceeded | EventType::PaymentFailed, status) => {
                Err(PaymentError::ClientActionRequired(status))
            }

            (EventType::PaymentExpired, _) => Ok(Expired),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
