//! # checkout-gateway
//!
//! Mercado Pago integration for the checkout service.
//!
//! ## Payment Flow
//!
//! ```text
//! ┌─────────────┐  preference  ┌─────────────┐   REST   ┌──────────────┐
//! │  Storefront │─────────────▶│   Adapter   │─────────▶│ Mercado Pago │
//! │   (Brick)   │◀─────────────│  (server)   │◀─────────│     API      │
//! └─────────────┘  id, status  └─────────────┘          └──────────────┘
//!                                     ▲                        │
//!                                     └──────── webhook ───────┘
//! ```
//!
//! The Payment Brick tokenizes card data in the browser; this crate only ever
//! sees opaque tokens. Status values, field names and URLs are Mercado Pago's
//! wire contract and are reproduced exactly.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use checkout_gateway::{CheckoutService, CheckoutSettings, MercadoPagoClient, MercadoPagoConfig};
//!
//! let gateway = Arc::new(MercadoPagoClient::new(MercadoPagoConfig::new(access_token))?);
//! let settings = CheckoutSettings::new("http://localhost:3000", "http://localhost:3001")?;
//! let checkout = CheckoutService::new(gateway, settings);
//!
//! let created = checkout.create_preference(&request).await?;
//! // Hand created.preference_id to the Payment Brick
//! ```

mod checkout;
mod error;
pub mod gateway;
pub mod model;
mod webhook;

pub use checkout::{
    CheckoutService, CheckoutSettings, CreatePreferenceRequest, DEFAULT_CURRENCY, LineItem,
    PayerDetails, PaymentOutcome, PreferenceCreated, ProcessPaymentRequest,
};
pub use error::{PaymentError, Result};
pub use gateway::{MercadoPagoClient, MercadoPagoConfig, MockGateway, PaymentGateway};
pub use model::{Identification, PaymentStatus};
pub use webhook::{WebhookNotification, WebhookOutcome};
