//! Page Components

mod checkout;
mod result;

pub use checkout::CheckoutPage;
pub use result::{BackUrlOutcome, PaymentResultPage};
