//! HTTP Handlers

use std::collections::HashMap;

use axum::{
    Json,
    body::Bytes,
    extract::{
        Query, State,
        rejection::{BytesRejection, JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use checkout_gateway::{
    CreatePreferenceRequest, PaymentError, PaymentOutcome, PreferenceCreated,
    ProcessPaymentRequest, WebhookNotification,
};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub version: &'static str,
    pub gateway: String,
}

/// Fixed webhook acknowledgement
#[derive(Debug, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Gateway error body, relayed for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

// ============================================================================
// Errors
// ============================================================================

/// Handler error, rendered as `ErrorResponse`
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Payment(#[from] PaymentError),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, detail) = match &self {
            Self::Payment(e) => (
                StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                e.code(),
                e.detail().cloned(),
            ),
            Self::InvalidBody(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", None),
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.into(),
            detail,
        };
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Liveness probe
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Payment service is running",
        version: env!("CARGO_PKG_VERSION"),
        gateway: state.checkout.gateway_name().to_string(),
    })
}

/// Create a checkout preference
pub async fn create_preference(
    State(state): State<AppState>,
    payload: Result<Json<CreatePreferenceRequest>, JsonRejection>,
) -> Result<Json<PreferenceCreated>, ApiError> {
    let Json(request) = payload?;
    let created = state.checkout.create_preference(&request).await?;
    Ok(Json(created))
}

/// Charge a Brick-tokenized payment
pub async fn process_payment(
    State(state): State<AppState>,
    payload: Result<Json<ProcessPaymentRequest>, JsonRejection>,
) -> Result<Json<PaymentOutcome>, ApiError> {
    let Json(request) = payload?;
    let outcome = state.checkout.process_payment(&request).await?;
    Ok(Json(outcome))
}

/// Mercado Pago notification endpoint
///
/// Always answers 200 with `{"status":"ok"}`, whatever arrives.
pub async fn webhook(
    State(state): State<AppState>,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Json<AckResponse> {
    let query = query.map(|Query(q)| q).unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unreadable webhook query");
        HashMap::new()
    });
    let body = body.unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Unreadable webhook body");
        Bytes::new()
    });

    let notification = WebhookNotification::parse(&body, &query);
    tracing::info!(notification = ?notification, "Received webhook");

    let outcome = state.checkout.handle_webhook(&notification).await;
    tracing::debug!(outcome = ?outcome, "Webhook handled");

    Json(AckResponse { status: "ok" })
}
