//! Mock Gateway
//!
//! For testing and offline demos. Never talks to the network.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;

use super::PaymentGateway;
use crate::error::{PaymentError, Result};
use crate::model::{
    PaymentBody, PaymentResponse, PaymentStatus, PreferenceBody, PreferenceResponse,
};

/// Deterministic in-process gateway
///
/// Tokens starting with `rejected` or `invalid` are refused the way the real
/// API refuses a bad card token. Tokens starting with `pending` produce a
/// pending payment.
pub struct MockGateway {
    next_id: AtomicU64,
    lookups: AtomicUsize,
    fail_lookups: bool,
    fail_preferences: bool,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1000),
            lookups: AtomicUsize::new(0),
            fail_lookups: false,
            fail_preferences: false,
        }
    }

    /// Every `get_payment` fails with an upstream 404
    pub fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Self::new()
        }
    }

    /// Every `create_preference` fails with an upstream 502
    pub fn failing_preferences() -> Self {
        Self {
            fail_preferences: true,
            ..Self::new()
        }
    }

    /// Number of `get_payment` calls seen so far
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_preference(&self, body: &PreferenceBody) -> Result<PreferenceResponse> {
        if self.fail_preferences {
            return Err(PaymentError::Gateway {
                status: 502,
                message: "Bad Gateway".into(),
                detail: Some(serde_json::json!({
                    "message": "Bad Gateway",
                    "error": "internal_error",
                    "status": 502,
                })),
            });
        }

        let id = format!("mock-pref-{}-{}", self.next_id(), body.external_reference);
        Ok(PreferenceResponse {
            init_point: format!("https://www.mercadopago.com/checkout/v1/redirect?pref_id={id}"),
            sandbox_init_point: Some(format!(
                "https://sandbox.mercadopago.com/checkout/v1/redirect?pref_id={id}"
            )),
            id,
        })
    }

    async fn create_payment(&self, body: &PaymentBody) -> Result<PaymentResponse> {
        if body.token.starts_with("rejected") || body.token.starts_with("invalid") {
            return Err(PaymentError::Gateway {
                status: 400,
                message: "Invalid card_token_id".into(),
                detail: Some(serde_json::json!({
                    "message": "Invalid card_token_id",
                    "error": "bad_request",
                    "status": 400,
                })),
            });
        }

        let (status, detail) = if body.token.starts_with("pending") {
            (PaymentStatus::Pending, "pending_waiting_payment")
        } else {
            (PaymentStatus::Approved, "accredited")
        };

        Ok(PaymentResponse {
            id: self.next_id(),
            status,
            status_detail: Some(detail.into()),
            external_reference: Some(body.external_reference.clone()),
            transaction_amount: Some(body.transaction_amount),
            date_created: Some(Utc::now().fixed_offset()),
        })
    }

    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResponse> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        if self.fail_lookups {
            return Err(PaymentError::Gateway {
                status: 404,
                message: format!("Payment not found: {payment_id}"),
                detail: None,
            });
        }

        let id = payment_id
            .parse()
            .map_err(|_| PaymentError::validation(format!("invalid payment id: {payment_id:?}")))?;

        Ok(PaymentResponse {
            id,
            status: PaymentStatus::Approved,
            status_detail: Some("accredited".into()),
            external_reference: Some("ORDER-MOCK".into()),
            transaction_amount: None,
            date_created: None,
        })
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_failure_is_counted() {
        let gateway = MockGateway::failing_lookups();
        assert!(gateway.get_payment("123").await.is_err());
        assert_eq!(gateway.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_lookup_parses_numeric_id() {
        let gateway = MockGateway::new();
        let payment = gateway.get_payment("123").await.unwrap();
        assert_eq!(payment.id, 123);
        assert!(gateway.get_payment("abc").await.is_err());
    }
}
