//! Mercado Pago Payment Brick bindings
//!
//! The SDK is loaded from `https://sdk.mercadopago.com/js/v2` in
//! `index.html` and exposes a global `MercadoPago` constructor.

use std::future::Future;

use js_sys::{JSON, Object, Promise, Reflect};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::api::{PayerPayload, PaymentRequest};

/// DOM id the Brick renders into
pub const BRICK_CONTAINER: &str = "paymentBrick_container";

#[wasm_bindgen]
extern "C" {
    type MercadoPago;

    #[wasm_bindgen(constructor, catch)]
    fn new(public_key: &str, options: &JsValue) -> Result<MercadoPago, JsValue>;

    #[wasm_bindgen(method)]
    fn bricks(this: &MercadoPago) -> BricksBuilder;

    type BricksBuilder;

    #[wasm_bindgen(method, catch)]
    fn create(
        this: &BricksBuilder,
        kind: &str,
        container_id: &str,
        settings: &JsValue,
    ) -> Result<Promise, JsValue>;
}

/// Form data the Brick hands to `onSubmit`
///
/// Ticket and wallet methods omit `token` and `installments`; they are
/// forwarded empty and the backend answers with a validation error.
#[derive(Clone, Debug, Deserialize)]
pub struct BrickFormData {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub issuer_id: Option<serde_json::Value>,
    #[serde(default)]
    pub payment_method_id: String,
    #[serde(default)]
    pub transaction_amount: f64,
    #[serde(default)]
    pub installments: u32,
    #[serde(default)]
    pub payer: BrickPayer,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BrickPayer {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub identification: Option<BrickIdentification>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrickIdentification {
    #[serde(rename = "type")]
    pub kind: String,
    pub number: String,
}

impl BrickFormData {
    /// Rename Brick fields into the backend's request shape
    ///
    /// | Brick                  | Backend              |
    /// |------------------------|----------------------|
    /// | `token`                | `token`              |
    /// | `payment_method_id`    | `paymentMethodId`    |
    /// | `payer.email`          | `email`              |
    /// | `transaction_amount`   | `transactionAmount`  |
    /// | `installments`         | `installments`       |
    /// | `issuer_id`            | `issuerId`           |
    /// | `payer.identification` | `payer.identification` |
    pub fn into_payment_request(self, order_id: &str) -> PaymentRequest {
        let issuer_id = match self.issuer_id {
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };

        let payer = self.payer.identification.map(|identification| PayerPayload {
            email: self.payer.email.clone(),
            identification: Some(identification),
        });

        PaymentRequest {
            token: self.token,
            payment_method_id: self.payment_method_id,
            email: self.payer.email,
            transaction_amount: self.transaction_amount,
            installments: self.installments,
            order_id: order_id.to_string(),
            issuer_id,
            payer,
        }
    }
}

/// Decode the JSON text of `event.formData`. `None` for `null` or non-objects.
fn parse_form_data(json: &str) -> Option<BrickFormData> {
    serde_json::from_str(json).ok()
}

fn set(target: &JsValue, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

/// Render the Payment Brick into [`BRICK_CONTAINER`]
///
/// `handle_submit` resolving `Ok` resolves the Brick's promise (the Brick stops
/// its spinner); `Err` rejects it.
pub fn mount_payment_brick<F, Fut>(
    public_key: &str,
    preference_id: &str,
    amount: f64,
    handle_submit: F,
) -> Result<(), JsValue>
where
    F: Fn(BrickFormData) -> Fut + 'static,
    Fut: Future<Output = Result<(), String>> + 'static,
{
    let options = JSON::parse(r#"{"locale":"es-PE"}"#)?;
    let sdk = MercadoPago::new(public_key, &options)?;

    let settings = serde_json::json!({
        "initialization": {
            "amount": amount,
            "preferenceId": preference_id,
        },
        "customization": {
            "paymentMethods": {
                "creditCard": "all",
                "debitCard": "all",
                "mercadoPago": "all",
            },
        },
    });
    let settings = JSON::parse(&settings.to_string())?;

    let on_ready = Closure::<dyn Fn()>::new(|| {
        leptos::logging::log!("Payment Brick ready");
    });

    let on_error = Closure::<dyn Fn(JsValue)>::new(|error: JsValue| {
        leptos::logging::error!("Payment Brick error: {:?}", error);
    });

    let on_submit = Closure::<dyn Fn(JsValue) -> Promise>::new(move |event: JsValue| {
        let form = Reflect::get(&event, &JsValue::from_str("formData"))
            .and_then(|data| JSON::stringify(&data))
            .ok()
            .and_then(|json| json.as_string())
            .and_then(|json| parse_form_data(&json));

        match form {
            Some(form) => {
                let pending = handle_submit(form);
                future_to_promise(async move {
                    pending
                        .await
                        .map(|()| JsValue::UNDEFINED)
                        .map_err(|e| JsValue::from_str(&e))
                })
            }
            None => {
                leptos::logging::error!("Unreadable Brick form data");
                notify("The payment form data could not be read. Please try again.");
                Promise::resolve(&JsValue::UNDEFINED)
            }
        }
    });

    let callbacks = Object::new();
    set(&callbacks, "onReady", on_ready.as_ref())?;
    set(&callbacks, "onError", on_error.as_ref())?;
    set(&callbacks, "onSubmit", on_submit.as_ref())?;
    set(&settings, "callbacks", &callbacks)?;

    // The Brick keeps calling these for the life of the page
    on_ready.forget();
    on_error.forget();
    on_submit.forget();

    let created = sdk.bricks().create("payment", BRICK_CONTAINER, &settings)?;
    let on_rejected = Closure::<dyn FnMut(JsValue)>::new(|error: JsValue| {
        leptos::logging::error!("Payment Brick failed to render: {:?}", error);
    });
    let _ = created.catch(&on_rejected);
    on_rejected.forget();

    Ok(())
}

/// Blocking notification for the buyer
pub fn notify(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(raw: serde_json::Value) -> BrickFormData {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_translation_renames_fields() {
        let request = form(serde_json::json!({
            "token": "ff8080814c11e237014c1ff593b57b4d",
            "issuer_id": "310",
            "payment_method_id": "visa",
            "transaction_amount": 250.0,
            "installments": 3,
            "payer": {
                "email": "buyer@example.com",
                "identification": { "type": "DNI", "number": "12345678" }
            }
        }))
        .into_payment_request("ORDER-1");

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["paymentMethodId"], "visa");
        assert_eq!(json["email"], "buyer@example.com");
        assert_eq!(json["transactionAmount"], 250.0);
        assert_eq!(json["installments"], 3);
        assert_eq!(json["orderId"], "ORDER-1");
        assert_eq!(json["issuerId"], "310");
        assert_eq!(json["payer"]["identification"]["type"], "DNI");
    }

    #[test]
    fn test_ticket_submission_is_forwarded() {
        let form = parse_form_data(
            r#"{"payment_method_id":"pagoefectivo_atm","transaction_amount":250.0,"payer":{"email":"buyer@example.com"}}"#,
        )
        .unwrap();
        let request = form.into_payment_request("ORDER-3");

        assert_eq!(request.payment_method_id, "pagoefectivo_atm");
        assert_eq!(request.token, "");
        assert_eq!(request.installments, 0);
        assert_eq!(request.email, "buyer@example.com");
    }

    #[test]
    fn test_null_form_data_is_unreadable() {
        assert!(parse_form_data("null").is_none());
        assert!(parse_form_data("[]").is_none());
        assert!(parse_form_data("{}").is_some());
    }

    #[test]
    fn test_translation_without_optional_fields() {
        let request = form(serde_json::json!({
            "token": "tok",
            "issuer_id": 24,
            "payment_method_id": "master",
            "transaction_amount": 99.5,
            "installments": 1,
            "payer": { "email": "buyer@example.com" }
        }))
        .into_payment_request("ORDER-2");

        assert_eq!(request.issuer_id.as_deref(), Some("24"));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("payer").is_none());
    }
}
