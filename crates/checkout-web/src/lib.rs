//! Checkout Storefront
//!
//! Leptos-based WASM page that renders the Mercado Pago Payment Brick and
//! forwards its tokenized form data to the checkout server.

mod api;
mod app;
mod brick;
mod components;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
