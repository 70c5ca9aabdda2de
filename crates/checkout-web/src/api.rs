//! API Client

use serde::{Deserialize, Serialize};

use crate::brick::BrickIdentification;

/// Backend origin, fixed at build time
pub const API_URL: &str = match option_env!("CHECKOUT_API_URL") {
    Some(url) => url,
    None => "http://localhost:3001",
};

#[derive(Clone, Debug, Serialize)]
pub struct PreferenceItem {
    pub title: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub currency_id: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceRequest {
    pub items: Vec<PreferenceItem>,
    pub order_id: String,
    pub customer_email: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceReply {
    #[serde(default)]
    pub preference_id: String,
    #[serde(default)]
    pub init_point: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub token: String,
    pub payment_method_id: String,
    pub email: String,
    pub transaction_amount: f64,
    pub installments: u32,
    pub order_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<PayerPayload>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PayerPayload {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identification: Option<BrickIdentification>,
}

/// What the backend said about a payment
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentReply {
    Processed {
        id: u64,
        status: String,
        status_detail: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl PaymentReply {
    /// Interpret a backend body by HTTP outcome
    pub fn from_body(success: bool, body: &serde_json::Value) -> Self {
        let id = body["id"].as_u64();
        let status = body["status"].as_str();

        match (success, id, status) {
            (true, Some(id), Some(status)) => Self::Processed {
                id,
                status: status.to_string(),
                status_detail: body["status_detail"].as_str().map(str::to_string),
            },
            _ => Self::Failed {
                error: body["error"]
                    .as_str()
                    .unwrap_or("Request failed")
                    .to_string(),
            },
        }
    }
}

/// Ask the backend for a preference id
pub async fn create_preference(request: &PreferenceRequest) -> Result<PreferenceReply, String> {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{API_URL}/payment/create-preference"))
        .json(request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        response.json().await.map_err(|e| e.to_string())
    } else {
        let data: serde_json::Value = response.json().await.unwrap_or_default();
        Err(data["error"].as_str().unwrap_or("Failed to create preference").to_string())
    }
}

/// Forward Brick form data. `Err` only on network failure.
pub async fn process_payment(request: &PaymentRequest) -> Result<PaymentReply, String> {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{API_URL}/payment/process"))
        .json(request)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let success = response.status().is_success();
    let data: serde_json::Value = response.json().await.unwrap_or_default();
    Ok(PaymentReply::from_body(success, &data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_processed_reply() {
        let body = json!({ "id": 42, "status": "approved", "status_detail": "accredited" });
        assert_eq!(
            PaymentReply::from_body(true, &body),
            PaymentReply::Processed {
                id: 42,
                status: "approved".into(),
                status_detail: Some("accredited".into()),
            }
        );
    }

    #[test]
    fn test_error_reply() {
        let body = json!({ "error": "Mercado Pago error (400): Invalid card_token_id", "code": "GATEWAY_REJECTED" });
        assert_eq!(
            PaymentReply::from_body(false, &body),
            PaymentReply::Failed { error: "Mercado Pago error (400): Invalid card_token_id".into() }
        );
        assert_eq!(
            PaymentReply::from_body(false, &serde_json::Value::Null),
            PaymentReply::Failed { error: "Request failed".into() }
        );
    }

    #[test]
    fn test_preference_request_shape() {
        let request = PreferenceRequest {
            items: vec![PreferenceItem {
                title: "Test".into(),
                quantity: 1,
                unit_price: 250.0,
                currency_id: "PEN".into(),
            }],
            order_id: "ORDER-1".into(),
            customer_email: "buyer@example.com".into(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["orderId"], "ORDER-1");
        assert_eq!(json["customerEmail"], "buyer@example.com");
        assert_eq!(json["items"][0]["unit_price"], 250.0);
    }
}
