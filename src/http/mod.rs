// ============================================================================
// HTTP Transport - actix-web adapter over the payment command handler
// ============================================================================
//
// Owns request/response shapes and the mapping from error kinds to status
// codes. No payment state lives here.
//
// ============================================================================

pub mod handlers;
mod server;

use std::sync::Arc;

use crate::domain::payment::PaymentCommandHandler;
use crate::metrics::Metrics;

pub use server::{configure, start_server};

/// Shared state handed to every request
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<PaymentCommandHandler>,
    pub metrics: Arc<Metrics>,
}
