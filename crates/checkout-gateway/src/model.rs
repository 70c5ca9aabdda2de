//! Mercado Pago Wire Types
//!
//! Field names and enum values here are the vendor's contract and must not
//! be renamed.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// Preferences
// ============================================================================

/// Body of `POST /checkout/preferences`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreferenceBody {
    pub items: Vec<PreferenceItem>,
    pub payer: PreferencePayer,
    pub back_urls: BackUrls,
    pub auto_return: String,
    pub external_reference: String,
    pub notification_url: String,
    pub statement_descriptor: String,
    pub payment_methods: PaymentMethodsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PreferenceItem {
    pub id: String,
    pub title: String,
    pub quantity: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    pub currency_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencePayer {
    pub email: String,
}

/// Where the hosted checkout sends the buyer afterwards
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackUrls {
    pub success: String,
    pub failure: String,
    pub pending: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentMethodsConfig {
    /// Installment ceiling offered to the buyer
    pub installments: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PreferenceResponse {
    pub id: String,
    pub init_point: String,
    #[serde(default)]
    pub sandbox_init_point: Option<String>,
}

// ============================================================================
// Payments
// ============================================================================

/// Body of `POST /v1/payments`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentBody {
    #[serde(with = "rust_decimal::serde::float")]
    pub transaction_amount: Decimal,
    pub token: String,
    pub description: String,
    pub installments: u32,
    pub payment_method_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    pub payer: PaymentPayer,
    pub external_reference: String,
    pub notification_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPayer {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<Identification>,
}

/// Payer document (e.g. DNI 12345678)
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
}

/// Payment record as returned by create and lookup
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub id: u64,
    pub status: PaymentStatus,
    #[serde(default)]
    pub status_detail: Option<String>,
    #[serde(default)]
    pub external_reference: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub transaction_amount: Option<Decimal>,
    #[serde(default)]
    pub date_created: Option<DateTime<FixedOffset>>,
}

/// Payment status as defined by Mercado Pago
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Approved,
    Pending,
    Authorized,
    InProcess,
    InMediation,
    Rejected,
    Cancelled,
    Refunded,
    ChargedBack,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::InProcess => "in_process",
            Self::InMediation => "in_mediation",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::ChargedBack => "charged_back",
            Self::Unknown => "unknown",
        }
    }

    /// Money was captured or is about to be
    pub fn is_successful(&self) -> bool {
        matches!(self, Self::Approved | Self::Authorized)
    }

    /// Still waiting on the buyer or on manual review
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Pending | Self::InProcess | Self::InMediation)
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
