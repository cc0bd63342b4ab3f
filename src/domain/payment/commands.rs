use serde::{Deserialize, Serialize};

// ============================================================================
// Payment Commands - Represent user / provider intent
// ============================================================================
//
// Creation is not a command: a payment is only ever born through
// `PaymentAggregate::create`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum PaymentCommand {
    GenerateLink { base_domain: String },
    MarkClientRedirected,
    Succeed,
    Fail { reason: String },
}

impl PaymentCommand {
    /// Label used in logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            PaymentCommand::GenerateLink { .. } => "generate_link",
            PaymentCommand::MarkClientRedirected => "client_redirected",
            PaymentCommand::Succeed => "succeed",
            PaymentCommand::Fail { .. } => "fail",
        }
    }
}

/// Status reported by the payment provider's webhook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookStatus {
    Redirected,
    Success,
    Failed,
}

pub const DEFAULT_DECLINE_REASON: &str = "declined by provider";

impl WebhookStatus {
    /// Map a provider notification to the aggregate command it triggers
    pub fn into_command(self, reason: Option<String>) -> PaymentCommand {
        match self {
            WebhookStatus::Redirected => PaymentCommand::MarkClientRedirected,
            WebhookStatus::Success => PaymentCommand::Succeed,
            WebhookStatus::Failed => PaymentCommand::Fail {
                reason: reason.unwrap_or_else(|| DEFAULT_DECLINE_REASON.to_string()),
            },
        }
    }
}
