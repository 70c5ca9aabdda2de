//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Missing or unusable configuration (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request rejected before reaching the gateway
    #[error("Validation error: {0}")]
    Validation(String),

    /// Gateway answered with a non-success status
    #[error("Mercado Pago error ({status}): {message}")]
    Gateway {
        status: u16,
        message: String,
        /// Vendor error body, relayed to the caller as-is
        detail: Option<serde_json::Value>,
    },

    /// Transport failure or timeout talking to the gateway
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Gateway answered 2xx with a body we could not read
    #[error("Unexpected gateway response: {0}")]
    Decode(String),
}

impl PaymentError {
    /// Build a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Whether the failure is the caller's fault rather than ours or the gateway's.
    ///
    /// Upstream 401/403 mean our access token is wrong, so they count as
    /// infrastructure failures even though they are 4xx.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::Validation(_) => true,
            Self::Gateway { status, .. } => {
                (400..500).contains(status) && !matches!(status, 401 | 403)
            }
            _ => false,
        }
    }

    /// HTTP status the adapter answers with
    pub fn http_status(&self) -> u16 {
        if self.is_client_error() { 400 } else { 500 }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Gateway { .. } if self.is_client_error() => "GATEWAY_REJECTED",
            Self::Gateway { .. } | Self::Decode(_) => "GATEWAY_ERROR",
            Self::Network(_) => "GATEWAY_UNAVAILABLE",
        }
    }

    /// Vendor error detail, when the gateway sent one
    pub fn detail(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Gateway { detail, .. } => detail.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(status: u16) -> PaymentError {
        PaymentError::Gateway {
            status,
            message: "boom".into(),
            detail: None,
        }
    }

    #[test]
    fn test_upstream_rejections_are_client_errors() {
        assert_eq!(gateway(400).http_status(), 400);
        assert_eq!(gateway(404).http_status(), 400);
        assert_eq!(gateway(400).code(), "GATEWAY_REJECTED");
    }

    #[test]
    fn test_credential_and_server_failures_are_ours() {
        assert_eq!(gateway(401).http_status(), 500);
        assert_eq!(gateway(403).http_status(), 500);
        assert_eq!(gateway(502).http_status(), 500);
        assert_eq!(gateway(502).code(), "GATEWAY_ERROR");
    }

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err = PaymentError::validation("quantity must be positive");
        assert_eq!(err.http_status(), 400);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert!(err.to_string().contains("quantity"));
    }
}
