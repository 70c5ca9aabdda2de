//! Mercado Pago REST Client
//!
//! Implementation of `PaymentGateway` over the public Mercado Pago API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use super::PaymentGateway;
use crate::error::{PaymentError, Result};
use crate::model::{PaymentBody, PaymentResponse, PreferenceBody, PreferenceResponse};

const DEFAULT_BASE_URL: &str = "https://api.mercadopago.com";

/// Mercado Pago client configuration
#[derive(Clone, Debug)]
pub struct MercadoPagoConfig {
    /// Private access token (`APP_USR-...` or `TEST-...`)
    pub access_token: String,

    /// API root, overridable for tests
    pub base_url: String,

    /// Request timeout in milliseconds
    pub timeout_ms: u64,
}

impl MercadoPagoConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_ms: 5000,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Mercado Pago API client
pub struct MercadoPagoClient {
    http: reqwest::Client,
    config: MercadoPagoConfig,
}

impl MercadoPagoClient {
    /// Create a new client. An empty access token is a configuration error.
    pub fn new(config: MercadoPagoConfig) -> Result<Self> {
        if config.access_token.trim().is_empty() {
            return Err(PaymentError::Config("MP_ACCESS_TOKEN is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Send an authorized request and decode the success body
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(gateway_error(status, &text));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PaymentError::Decode(e.to_string()))
    }
}

/// Turn a vendor error body into a `PaymentError::Gateway`
fn gateway_error(status: StatusCode, body: &str) -> PaymentError {
    let detail = serde_json::from_str::<serde_json::Value>(body).ok();
    let message = detail
        .as_ref()
        .and_then(|d| d.get("message"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(
            || status.canonical_reason().unwrap_or("gateway error").to_string(),
            str::to_string,
        );

    PaymentError::Gateway {
        status: status.as_u16(),
        message,
        detail,
    }
}

#[async_trait]
impl PaymentGateway for MercadoPagoClient {
    async fn create_preference(&self, body: &PreferenceBody) -> Result<PreferenceResponse> {
        let request = self.http.post(self.url("/checkout/preferences")).json(body);
        self.send(request).await
    }

    async fn create_payment(&self, body: &PaymentBody) -> Result<PaymentResponse> {
        let request = self
            .http
            .post(self.url("/v1/payments"))
            .header("X-Idempotency-Key", uuid::Uuid::new_v4().to_string())
            .json(body);
        self.send(request).await
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResponse> {
        if payment_id.is_empty() || !payment_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PaymentError::validation(format!("invalid payment id: {payment_id:?}")));
        }
        let request = self.http.get(self.url(&format!("/v1/payments/{payment_id}")));
        self.send(request).await
    }

    fn name(&self) -> &str {
        "MercadoPago"
    }
}
