//! Checkout Operations
//!
//! Request shapes accepted from the storefront and their translation into
//! Mercado Pago preference and payment bodies.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{PaymentError, Result};
use crate::gateway::PaymentGateway;
use crate::model::{
    BackUrls, Identification, PaymentBody, PaymentMethodsConfig, PaymentPayer, PaymentStatus,
    PreferenceBody, PreferenceItem, PreferencePayer,
};
use crate::webhook::{WebhookNotification, WebhookOutcome};

pub const DEFAULT_CURRENCY: &str = "PEN";

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

// ============================================================================
// Storefront request/response shapes
// ============================================================================

/// Request to create a checkout preference
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePreferenceRequest {
    /// Line items, in display order
    pub items: Vec<LineItem>,

    /// Merchant order id, echoed back as `external_reference`
    pub order_id: String,

    pub customer_email: String,
}

/// A purchasable line item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LineItem {
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(default = "default_currency")]
    pub currency_id: String,
}

/// Result of creating a preference
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceCreated {
    pub preference_id: String,
    pub init_point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_init_point: Option<String>,
}

/// Request to charge a Brick-tokenized payment method
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPaymentRequest {
    pub token: String,
    pub payment_method_id: String,
    pub email: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_amount: Decimal,
    pub installments: u32,
    pub order_id: String,
    #[serde(default)]
    pub issuer_id: Option<String>,
    #[serde(default)]
    pub payer: Option<PayerDetails>,
}

/// Optional payer data collected by the Brick
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PayerDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub identification: Option<Identification>,
}

/// Status triplet returned to the storefront
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub id: u64,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_reference: Option<String>,
}

// ============================================================================
// Validation
// ============================================================================

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PaymentError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> Result<()> {
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        })
        && !value.chars().any(char::is_whitespace);

    if !valid {
        return Err(PaymentError::validation(format!("{field} must be a valid email address")));
    }
    Ok(())
}

impl CreatePreferenceRequest {
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(PaymentError::validation("items must not be empty"));
        }
        for (index, item) in self.items.iter().enumerate() {
            let n = index + 1;
            require_non_empty(&format!("items[{n}].title"), &item.title)?;
            if item.quantity == 0 {
                return Err(PaymentError::validation(format!("items[{n}].quantity must be positive")));
            }
            if item.unit_price <= Decimal::ZERO {
                return Err(PaymentError::validation(format!("items[{n}].unit_price must be positive")));
            }
            require_non_empty(&format!("items[{n}].currency_id"), &item.currency_id)?;
        }
        require_non_empty("orderId", &self.order_id)?;
        require_email("customerEmail", &self.customer_email)
    }
}

impl ProcessPaymentRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty("token", &self.token)?;
        require_non_empty("paymentMethodId", &self.payment_method_id)?;
        require_non_empty("orderId", &self.order_id)?;
        require_email("email", &self.email)?;
        if self.transaction_amount <= Decimal::ZERO {
            return Err(PaymentError::validation("transactionAmount must be positive"));
        }
        if self.installments == 0 {
            return Err(PaymentError::validation("installments must be at least 1"));
        }
        Ok(())
    }
}

// ============================================================================
// Service
// ============================================================================

/// Merchant-side settings applied to every preference and payment
#[derive(Clone, Debug)]
pub struct CheckoutSettings {
    /// Storefront origin, base of the back URLs
    pub frontend_url: Url,

    /// Publicly reachable adapter origin, base of the webhook URL
    pub backend_url: Url,

    /// Text on the buyer's card statement
    pub statement_descriptor: String,

    /// Installment ceiling offered in hosted checkout
    pub max_installments: u32,
}

impl CheckoutSettings {
    pub fn new(frontend_url: &str, backend_url: &str) -> Result<Self> {
        let parse = |name: &str, raw: &str| {
            Url::parse(raw).map_err(|e| PaymentError::Config(format!("{name} {raw:?}: {e}")))
        };
        Ok(Self {
            frontend_url: parse("FRONTEND_URL", frontend_url)?,
            backend_url: parse("BACKEND_URL", backend_url)?,
            statement_descriptor: "MI TIENDA".into(),
            max_installments: 12,
        })
    }

    fn frontend_path(&self, path: &str) -> String {
        format!("{}{path}", self.frontend_url.as_str().trim_end_matches('/'))
    }

    /// Where Mercado Pago posts notifications
    pub fn notification_url(&self) -> String {
        format!("{}/payment/webhook", self.backend_url.as_str().trim_end_matches('/'))
    }

    pub fn back_urls(&self) -> BackUrls {
        BackUrls {
            success: self.frontend_path("/pago-exitoso"),
            failure: self.frontend_path("/pago-fallido"),
            pending: self.frontend_path("/pago-pendiente"),
        }
    }
}

/// Stateless checkout operations over a shared gateway
pub struct CheckoutService {
    gateway: Arc<dyn PaymentGateway>,
    settings: CheckoutSettings,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn PaymentGateway>, settings: CheckoutSettings) -> Self {
        Self { gateway, settings }
    }

    pub fn gateway_name(&self) -> &str {
        self.gateway.name()
    }

    /// Compose the preference body sent to the gateway
    pub fn preference_body(&self, request: &CreatePreferenceRequest) -> PreferenceBody {
        PreferenceBody {
            items: request
                .items
                .iter()
                .enumerate()
                .map(|(index, item)| PreferenceItem {
                    id: format!("item-{}", index + 1),
                    title: item.title.clone(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    currency_id: item.currency_id.clone(),
                })
                .collect(),
            payer: PreferencePayer {
                email: request.customer_email.clone(),
            },
            back_urls: self.settings.back_urls(),
            auto_return: "approved".into(),
            external_reference: request.order_id.clone(),
            notification_url: self.settings.notification_url(),
            statement_descriptor: self.settings.statement_descriptor.clone(),
            payment_methods: PaymentMethodsConfig {
                installments: self.settings.max_installments,
            },
        }
    }

    /// Compose the direct-payment body sent to the gateway
    pub fn payment_body(&self, request: &ProcessPaymentRequest) -> PaymentBody {
        PaymentBody {
            transaction_amount: request.transaction_amount,
            token: request.token.clone(),
            description: format!("Payment for order #{}", request.order_id),
            installments: request.installments,
            payment_method_id: request.payment_method_id.clone(),
            issuer_id: request.issuer_id.clone().filter(|id| !id.is_empty()),
            payer: PaymentPayer {
                email: request.email.clone(),
                identification: request
                    .payer
                    .as_ref()
                    .and_then(|payer| payer.identification.clone()),
            },
            external_reference: request.order_id.clone(),
            notification_url: self.settings.notification_url(),
        }
    }

    /// Create a preference for the hosted checkout / Payment Brick
    pub async fn create_preference(
        &self,
        request: &CreatePreferenceRequest,
    ) -> Result<PreferenceCreated> {
        request.validate()?;

        let body = self.preference_body(request);
        let created = self.gateway.create_preference(&body).await.inspect_err(|e| {
            tracing::error!(order_id = %request.order_id, error = %e, "Preference creation failed");
        })?;

        tracing::info!(
            order_id = %request.order_id,
            preference_id = %created.id,
            items = body.items.len(),
            "Created preference"
        );

        Ok(PreferenceCreated {
            preference_id: created.id,
            init_point: created.init_point,
            sandbox_init_point: created.sandbox_init_point,
        })
    }

    /// Charge a tokenized card
    pub async fn process_payment(&self, request: &ProcessPaymentRequest) -> Result<PaymentOutcome> {
        request.validate()?;

        let body = self.payment_body(request);
        let payment = self.gateway.create_payment(&body).await.inspect_err(|e| {
            tracing::error!(order_id = %request.order_id, error = %e, "Payment processing failed");
        })?;

        tracing::info!(
            order_id = %request.order_id,
            payment_id = payment.id,
            status = %payment.status,
            status_detail = ?payment.status_detail,
            "Processed payment"
        );

        Ok(PaymentOutcome {
            id: payment.id,
            status: payment.status,
            status_detail: payment.status_detail,
            external_reference: payment.external_reference,
        })
    }

    /// React to a gateway notification. Never fails: the notifier retries on
    /// anything but 200, and nothing here mutates state.
    pub async fn handle_webhook(&self, notification: &WebhookNotification) -> WebhookOutcome {
        let payment_id = match notification {
            WebhookNotification::Payment { payment_id } => payment_id,
            WebhookNotification::Other { kind } => {
                tracing::debug!(kind = %kind, "Ignoring non-payment notification");
                return WebhookOutcome::Ignored {
                    reason: format!("unhandled type {kind}"),
                };
            }
            WebhookNotification::Unrecognized => {
                tracing::debug!("Ignoring notification without type or payment id");
                return WebhookOutcome::Ignored {
                    reason: "unrecognized notification".into(),
                };
            }
        };

        let payment = match self.gateway.get_payment(payment_id).await {
            Ok(payment) => payment,
            Err(e) => {
                tracing::warn!(payment_id = %payment_id, error = %e, "Webhook payment lookup failed");
                return WebhookOutcome::FetchFailed {
                    payment_id: payment_id.clone(),
                };
            }
        };

        let order_id = payment.external_reference.as_deref().unwrap_or("-");
        tracing::info!(
            payment_id = %payment_id,
            status = %payment.status,
            order_id = %order_id,
            amount = ?payment.transaction_amount,
            created = ?payment.date_created,
            "Payment notification"
        );

        let status = payment.status;
        if status.is_successful() {
            tracing::info!(order_id = %order_id, "Payment approved");
        } else if status.is_waiting() {
            tracing::info!(order_id = %order_id, "Payment pending");
        } else if matches!(status, PaymentStatus::Rejected | PaymentStatus::Cancelled) {
            tracing::warn!(order_id = %order_id, status = %status, "Payment rejected");
        } else {
            tracing::debug!(order_id = %order_id, status = %status, "Payment status unhandled");
        }

        WebhookOutcome::Fetched {
            payment_id: payment_id.clone(),
            status,
        }
    }
}
