//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::pages::{BackUrlOutcome, CheckoutPage, PaymentResultPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    view! {
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=CheckoutPage />
                    <Route
                        path=path!("/pago-exitoso")
                        view=|| view! { <PaymentResultPage outcome=BackUrlOutcome::Success /> }
                    />
                    <Route
                        path=path!("/pago-fallido")
                        view=|| view! { <PaymentResultPage outcome=BackUrlOutcome::Failure /> }
                    />
                    <Route
                        path=path!("/pago-pendiente")
                        view=|| view! { <PaymentResultPage outcome=BackUrlOutcome::Pending /> }
                    />
                </Routes>
            </main>
        </Router>
    }
}
