//! Mercado Pago Webhook Interpretation
//!
//! Notifications arrive unauthenticated and loosely shaped. Modern webhooks
//! carry `{ "type": "payment", "data": { "id": "123" } }` in the body and
//! `?type=payment&data.id=123` in the query; legacy IPN uses
//! `?topic=payment&id=123`. Only presence checks are applied.

use std::collections::HashMap;

use serde_json::Value;

use crate::model::PaymentStatus;

/// Parsed notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookNotification {
    /// A payment changed; look it up by id
    Payment { payment_id: String },

    /// Some other topic (merchant_order, plan, ...)
    Other { kind: String },

    /// No usable type or id
    Unrecognized,
}

/// What the adapter did with a notification
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WebhookOutcome {
    Fetched {
        payment_id: String,
        status: PaymentStatus,
    },
    FetchFailed {
        payment_id: String,
    },
    Ignored {
        reason: String,
    },
}

/// Render a JSON id (string or number) as text
fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty()).map(str::to_string)
}

impl WebhookNotification {
    /// Interpret a raw body and query string. Never fails.
    pub fn parse(body: &[u8], query: &HashMap<String, String>) -> Self {
        let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);

        let kind = body
            .get("type")
            .and_then(Value::as_str)
            .or_else(|| body.get("topic").and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| non_empty(query.get("type")))
            .or_else(|| non_empty(query.get("topic")));

        let Some(kind) = kind else {
            return Self::Unrecognized;
        };

        if kind != "payment" {
            return Self::Other { kind };
        }

        let payment_id = body
            .get("data")
            .and_then(|data| data.get("id"))
            .and_then(id_text)
            .or_else(|| non_empty(query.get("data.id")))
            .or_else(|| non_empty(query.get("id")));

        payment_id.map_or(Self::Unrecognized, |payment_id| Self::Payment { payment_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect()
    }

    #[test]
    fn test_body_notification() {
        let body = br#"{"type":"payment","data":{"id":"123"}}"#;
        assert_eq!(
            WebhookNotification::parse(body, &HashMap::new()),
            WebhookNotification::Payment { payment_id: "123".into() }
        );
    }

    #[test]
    fn test_numeric_id() {
        let body = br#"{"action":"payment.updated","type":"payment","data":{"id":987654}}"#;
        assert_eq!(
            WebhookNotification::parse(body, &HashMap::new()),
            WebhookNotification::Payment { payment_id: "987654".into() }
        );
    }

    #[test]
    fn test_query_only_notifications() {
        let modern = query(&[("type", "payment"), ("data.id", "55")]);
        assert_eq!(
            WebhookNotification::parse(b"", &modern),
            WebhookNotification::Payment { payment_id: "55".into() }
        );

        let legacy = query(&[("topic", "payment"), ("id", "77")]);
        assert_eq!(
            WebhookNotification::parse(b"not json", &legacy),
            WebhookNotification::Payment { payment_id: "77".into() }
        );
    }

    #[test]
    fn test_other_topics() {
        let legacy = query(&[("topic", "merchant_order"), ("id", "77")]);
        assert_eq!(
            WebhookNotification::parse(b"", &legacy),
            WebhookNotification::Other { kind: "merchant_order".into() }
        );
    }

    #[test]
    fn test_malformed_bodies() {
        let empty = HashMap::new();
        let bodies: [&[u8]; 6] =
            [b"", b"{", b"[]", b"null", br#"{"type":42}"#, br#"{"data":{"id":"1"}}"#];
        for body in bodies {
            assert_eq!(WebhookNotification::parse(body, &empty), WebhookNotification::Unrecognized);
        }

        let missing_id = br#"{"type":"payment","data":{}}"#;
        assert_eq!(WebhookNotification::parse(missing_id, &empty), WebhookNotification::Unrecognized);

        let blank_id = br#"{"type":"payment","data":{"id":"  "}}"#;
        assert_eq!(WebhookNotification::parse(blank_id, &empty), WebhookNotification::Unrecognized);
    }

    #[test]
    fn test_null_type_falls_back_to_topic() {
        let body = br#"{"type":null,"topic":"payment","data":{"id":"55"}}"#;
        assert_eq!(
            WebhookNotification::parse(body, &HashMap::new()),
            WebhookNotification::Payment { payment_id: "55".into() }
        );
    }
}
