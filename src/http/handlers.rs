use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::payment::{CommandError, ErrorKind, WebhookStatus};
use super::AppState;

// ============================================================================
// Request / Response Bodies
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub amount: Decimal,
    pub currency: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookRequest {
    pub payment_id: Uuid,
    pub status: WebhookStatus,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PaymentLinkResponse {
    pub link: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, message: impl Into<String>) -> HttpResponse {
        HttpResponse::build(status).json(ErrorBody { error: message.into() })
    }
}

impl ResponseError for CommandError {
    fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidTransition | ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        ErrorBody::response(self.status_code(), self.to_string())
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /payments
pub async fn create_payment(
    state: web::Data<AppState>,
    body: web::Json<CreatePaymentRequest>,
) -> Result<HttpResponse, CommandError> {
    let CreatePaymentRequest { amount, currency, description } = body.into_inner();

    let created = state.handler.create_payment(amount, &currency, description).await?;
    Ok(HttpResponse::Created().json(created))
}

/// POST /payments/{id}/link
pub async fn generate_link(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CommandError> {
    let link = state.handler.generate_link(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PaymentLinkResponse { link }))
}

/// GET /payments/{id}/history
pub async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CommandError> {
    let history = state.handler.get_history(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// POST /webhook
pub async fn webhook(
    state: web::Data<AppState>,
    body: web::Json<WebhookRequest>,
) -> Result<HttpResponse, CommandError> {
    let WebhookRequest { payment_id, status, reason } = body.into_inner();

    tracing::debug!(payment_id = %payment_id, status = ?status, "Received provider webhook");

    state.handler.handle_webhook(payment_id, status, reason).await?;
    Ok(HttpResponse::Ok().finish())
}

/// GET /metrics
pub async fn metrics_handler(state: web::Data<AppState>) -> HttpResponse {
    match state.metrics.render() {
        Ok(buffer) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(buffer),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            ErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics")
        }
    }
}

/// GET /health
pub async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "payment-events"
    }))
}
