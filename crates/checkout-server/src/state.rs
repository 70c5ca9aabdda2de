//! Application State

use std::sync::Arc;

use checkout_gateway::CheckoutService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout operations over the one gateway client built at startup
    pub checkout: Arc<CheckoutService>,
}

impl AppState {
    pub fn new(checkout: CheckoutService) -> Self {
        Self {
            checkout: Arc::new(checkout),
        }
    }
}
