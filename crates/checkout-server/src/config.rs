//! Server Configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use checkout_gateway::{CheckoutSettings, MercadoPagoConfig, PaymentError, Result};

/// Dev server origins that may always call the API
const DEV_ORIGINS: [&str; 3] = [
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:5173",
];

/// Process-wide configuration, read once at startup
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_url: String,
    pub backend_url: String,
    pub static_dir: PathBuf,
    pub statement_descriptor: String,
    pub max_installments: u32,
    pub gateway: MercadoPagoConfig,
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. `MP_ACCESS_TOKEN` is required and must be
    /// non-empty; everything else has a default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let access_token = lookup("MP_ACCESS_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| PaymentError::Config("MP_ACCESS_TOKEN not set".into()))?;

        let port: u16 = match lookup("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| PaymentError::Config(format!("PORT is not a valid port: {raw:?}")))?,
            None => 3001,
        };

        let max_installments: u32 = match lookup("MAX_INSTALLMENTS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n >= 1).ok_or_else(|| {
                PaymentError::Config(format!("MAX_INSTALLMENTS must be a positive integer: {raw:?}"))
            })?,
            None => 12,
        };

        let mut gateway = MercadoPagoConfig::new(access_token);
        if let Some(base_url) = lookup("MP_API_BASE_URL") {
            gateway = gateway.with_base_url(base_url);
        }

        Ok(Self {
            port,
            frontend_url: lookup("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".into()),
            backend_url: lookup("BACKEND_URL")
                .unwrap_or_else(|| format!("http://localhost:{port}")),
            static_dir: lookup("STATIC_DIR").map_or_else(|| PathBuf::from("static"), PathBuf::from),
            statement_descriptor: lookup("STATEMENT_DESCRIPTOR")
                .unwrap_or_else(|| "MI TIENDA".into()),
            max_installments,
            gateway,
        })
    }

    /// Merchant settings handed to the checkout service
    pub fn checkout_settings(&self) -> Result<CheckoutSettings> {
        let mut settings = CheckoutSettings::new(&self.frontend_url, &self.backend_url)?;
        settings.statement_descriptor.clone_from(&self.statement_descriptor);
        settings.max_installments = self.max_installments;
        Ok(settings)
    }

    /// Origins allowed by CORS: the storefront plus local dev servers
    pub fn cors_origins(&self) -> Vec<String> {
        let mut origins = vec![self.frontend_url.trim_end_matches('/').to_string()];
        for origin in DEV_ORIGINS {
            if !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}
