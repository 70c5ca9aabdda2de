//! Back URL Landing Pages

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::StatusBanner;

/// Which back URL Mercado Pago redirected to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackUrlOutcome {
    Success,
    Failure,
    Pending,
}

impl BackUrlOutcome {
    fn kind(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "error",
            Self::Pending => "info",
        }
    }

    fn message(self) -> &'static str {
        match self {
            Self::Success => "Payment approved. Thank you for your purchase!",
            Self::Failure => "The payment could not be completed.",
            Self::Pending => "Your payment is pending confirmation.",
        }
    }
}

#[component]
pub fn PaymentResultPage(outcome: BackUrlOutcome) -> impl IntoView {
    let query = use_query_map();
    let payment_id = move || query.get().get("payment_id");
    let order_id = move || query.get().get("external_reference");

    view! {
        <div class="result">
            <StatusBanner kind=outcome.kind() message=outcome.message() />
            {move || payment_id().map(|id| view! { <p>"Payment: " {id}</p> })}
            {move || order_id().map(|id| view! { <p>"Order: " {id}</p> })}
            <a href="/" class="btn">"Back to checkout"</a>
        </div>
    }
}
