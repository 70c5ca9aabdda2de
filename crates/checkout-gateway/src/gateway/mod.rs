//! Gateway Integration
//!
//! The outbound seam to the payment provider.

mod mercadopago;
mod mock;

pub use mercadopago::{MercadoPagoClient, MercadoPagoConfig};
pub use mock::MockGateway;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{PaymentBody, PaymentResponse, PreferenceBody, PreferenceResponse};

/// Payment gateway client trait (Strategy pattern)
///
/// One instance is built at startup and shared by every request; no
/// implementation may hold per-request state.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Register a checkout preference
    async fn create_preference(&self, body: &PreferenceBody) -> Result<PreferenceResponse>;

    /// Charge a tokenized payment method
    async fn create_payment(&self, body: &PaymentBody) -> Result<PaymentResponse>;

    /// Look up a payment by gateway id
    async fn get_payment(&self, payment_id: &str) -> Result<PaymentResponse>;

    /// Gateway name
    fn name(&self) -> &str;
}
