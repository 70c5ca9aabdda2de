//! UI Components

use leptos::prelude::*;

/// Inline status message
#[component]
pub fn StatusBanner(kind: &'static str, #[prop(into)] message: String) -> impl IntoView {
    let class = format!("status status-{kind}");

    view! {
        <div class=class>
            <p>{message}</p>
        </div>
    }
}
