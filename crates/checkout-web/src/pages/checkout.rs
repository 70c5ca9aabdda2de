//! Checkout Page

use leptos::logging::{error, log};
use leptos::prelude::*;

use crate::api::{self, PaymentReply, PaymentRequest, PreferenceItem, PreferenceReply, PreferenceRequest};
use crate::brick::{self, BRICK_CONTAINER};
use crate::components::StatusBanner;

const PUBLIC_KEY: &str = match option_env!("MP_PUBLIC_KEY") {
    Some(key) => key,
    None => "TEST-00000000-0000-0000-0000-000000000000",
};

const CART_TITLE: &str = "Nike Sneakers";
const CART_AMOUNT: f64 = 250.00;
const CART_CURRENCY: &str = "PEN";
const DEMO_EMAIL: &str = "test_user@testuser.com";

/// Page lifecycle. `Ready` and `Error` are terminal.
#[derive(Clone, Debug, PartialEq)]
pub enum CheckoutState {
    Loading,
    Ready { preference_id: String },
    Error(String),
}

impl CheckoutState {
    pub fn from_preference(result: Result<PreferenceReply, String>) -> Self {
        match result {
            Ok(reply) if !reply.preference_id.trim().is_empty() => Self::Ready {
                preference_id: reply.preference_id,
            },
            Ok(_) => Self::Error("The server returned no preference id".into()),
            Err(e) => Self::Error(format!("Could not start checkout: {e}")),
        }
    }
}

/// Message shown to the buyer once the backend answers
pub fn outcome_message(reply: &PaymentReply) -> String {
    match reply {
        PaymentReply::Processed { id, status, .. } => match status.as_str() {
            "approved" | "in_process" => format!("Payment processed successfully! ID: {id}"),
            "pending" => format!("Payment code generated. Complete the payment to confirm your order. ID: {id}"),
            other => format!("The payment was not approved. Status: {other}"),
        },
        PaymentReply::Failed { error } => format!("The payment could not be processed: {error}"),
    }
}

/// Fixed single-item cart
fn demo_order() -> PreferenceRequest {
    PreferenceRequest {
        items: vec![PreferenceItem {
            title: CART_TITLE.into(),
            quantity: 1,
            unit_price: CART_AMOUNT,
            currency_id: CART_CURRENCY.into(),
        }],
        order_id: format!("ORDER-{}", chrono::Utc::now().timestamp_millis()),
        customer_email: DEMO_EMAIL.into(),
    }
}

async fn submit_payment(request: PaymentRequest) -> Result<(), String> {
    log!("Sending payment for order {}", request.order_id);

    match api::process_payment(&request).await {
        Ok(reply) => {
            log!("Backend replied: {:?}", reply);
            brick::notify(&outcome_message(&reply));
            Ok(())
        }
        Err(e) => {
            error!("Network error: {}", e);
            brick::notify("Could not connect to the server");
            Err(e)
        }
    }
}

#[component]
pub fn CheckoutPage() -> impl IntoView {
    let (state, set_state) = signal(CheckoutState::Loading);

    let order = demo_order();
    let order_id = order.order_id.clone();

    leptos::task::spawn_local(async move {
        let next = CheckoutState::from_preference(api::create_preference(&order).await);

        if let CheckoutState::Ready { preference_id } = &next {
            let mounted = brick::mount_payment_brick(
                PUBLIC_KEY,
                preference_id,
                CART_AMOUNT,
                move |form| submit_payment(form.into_payment_request(&order_id)),
            );
            if let Err(e) = mounted {
                error!("Could not mount Payment Brick: {:?}", e);
                set_state.set(CheckoutState::Error("Could not load the payment form".into()));
                return;
            }
        }

        set_state.set(next);
    });

    view! {
        <div class="checkout">
            <h1>"Checkout: " {CART_TITLE}</h1>
            {move || match state.get() {
                CheckoutState::Loading => {
                    view! { <StatusBanner kind="info" message="Loading payment form..." /> }.into_any()
                }
                CheckoutState::Error(message) => {
                    view! { <StatusBanner kind="error" message=message /> }.into_any()
                }
                CheckoutState::Ready { .. } => {
                    view! { <p class="summary">{format!("Total: S/ {CART_AMOUNT:.2}")}</p> }.into_any()
                }
            }}
            <div id=BRICK_CONTAINER class="brick"></div>
        </div>
    }
}
