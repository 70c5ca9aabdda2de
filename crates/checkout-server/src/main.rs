//! checkout-server
//!
//! Axum-based adapter between the storefront's Payment Brick and the
//! Mercado Pago API.

mod config;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_gateway::{CheckoutService, MercadoPagoClient};

use crate::config::ServerConfig;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Missing credentials are fatal: refuse to serve
    let config = ServerConfig::from_env().inspect_err(|e| {
        tracing::error!("{e}");
        tracing::error!("  Set MP_ACCESS_TOKEN in the environment or .env");
    })?;
    let settings = config.checkout_settings()?;
    let webhook_url = settings.notification_url();

    // One gateway client for the whole process
    let gateway = Arc::new(MercadoPagoClient::new(config.gateway.clone())?);
    tracing::info!(base_url = %config.gateway.base_url, "✓ Mercado Pago configured");

    let state = AppState::new(CheckoutService::new(gateway, settings));
    let app = routes::router(state, &config.cors_origins(), &config.static_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 checkout-server running on http://{}", addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  POST /payment/create-preference - Create preference");
    tracing::info!("  POST /payment/process           - Process Brick payment");
    tracing::info!("  POST /payment/webhook           - Mercado Pago notifications");
    tracing::info!("  GET  /payment/health            - Health check");
    tracing::info!(frontend = %config.frontend_url, webhook = %webhook_url, "Callback URLs");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
