//! Router Assembly

use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::handlers::{create_preference, health_check, process_payment, webhook};
use crate::state::AppState;

/// CORS for the storefront: explicit origins, credentials allowed
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// `/payment/*` endpoints
fn payment_routes() -> Router<AppState> {
    Router::new()
        .route("/create-preference", post(create_preference))
        .route("/process", post(process_payment))
        .route("/webhook", post(webhook))
        .route("/health", get(health_check))
}

/// Full application router
///
/// Anything outside `/payment` is served from `static_dir`, falling back to
/// `index.html` so client-side routes (the back URLs) resolve.
pub fn router(state: AppState, cors_origins: &[String], static_dir: &Path) -> Router {
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    Router::new()
        .nest("/payment", payment_routes())
        .fallback_service(frontend)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use checkout_gateway::{CheckoutService, CheckoutSettings, MockGateway};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app_with(gateway: Arc<MockGateway>) -> Router {
        let settings =
            CheckoutSettings::new("http://localhost:3000", "http://localhost:3001").unwrap();
        let state = AppState::new(CheckoutService::new(gateway, settings));
        let origins = vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()];
        router(state, &origins, Path::new("does-not-exist"))
    }

    fn app() -> Router {
        app_with(Arc::new(MockGateway::new()))
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn payment(token: &str) -> Value {
        json!({
            "token": token,
            "paymentMethodId": "visa",
            "email": "buyer@example.com",
            "transactionAmount": 250.00,
            "installments": 1,
            "orderId": "ORDER-1"
        })
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/payment/health").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "Payment service is running");
    }

    #[tokio::test]
    async fn test_create_preference() {
        let request = post_json(
            "/payment/create-preference",
            &json!({
                "items": [{ "title": "Test", "quantity": 1, "unit_price": 250.00, "currency_id": "PEN" }],
                "orderId": "ORDER-1",
                "customerEmail": "buyer@example.com"
            }),
        );
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body["preferenceId"].as_str().unwrap().is_empty());
        assert!(body["initPoint"].as_str().unwrap().starts_with("https://"));
    }

    #[tokio::test]
    async fn test_create_preference_upstream_failure() {
        let request = post_json(
            "/payment/create-preference",
            &json!({
                "items": [{ "title": "Test", "quantity": 1, "unit_price": 250.00, "currency_id": "PEN" }],
                "orderId": "ORDER-1",
                "customerEmail": "buyer@example.com"
            }),
        );
        let (status, body) = send(app_with(Arc::new(MockGateway::failing_preferences())), request).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], "GATEWAY_ERROR");
        assert_eq!(body["detail"]["status"], 502);
        assert!(body["error"].as_str().unwrap().contains("502"));
    }

    #[tokio::test]
    async fn test_create_preference_validation() {
        let request = post_json(
            "/payment/create-preference",
            &json!({
                "items": [{ "title": "Test", "quantity": 0, "unit_price": 250.00 }],
                "orderId": "ORDER-1",
                "customerEmail": "buyer@example.com"
            }),
        );
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let request = Request::builder()
            .method("POST")
            .uri("/payment/process")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_process_payment_approved() {
        let (status, body) = send(app(), post_json("/payment/process", &payment("tok_ok"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "approved");
        assert_eq!(body["status_detail"], "accredited");
        assert_eq!(body["external_reference"], "ORDER-1");
        assert!(body["id"].is_u64());
    }

    #[tokio::test]
    async fn test_process_payment_rejected_token() {
        let (status, body) =
            send(app(), post_json("/payment/process", &payment("rejected-4242"))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "GATEWAY_REJECTED");
        assert_eq!(body["detail"]["message"], "Invalid card_token_id");
    }

    #[tokio::test]
    async fn test_webhook_always_acknowledges() {
        let app = app();
        let bodies = [
            "",
            "{",
            "null",
            r#"{"type":"plan","data":{"id":"1"}}"#,
            r#"{"type":"payment"}"#,
            r#"{"type":"payment","data":{"id":"123"}}"#,
        ];

        for raw in bodies {
            let (status, body) = send(app.clone(), post_raw("/payment/webhook", raw)).await;
            assert_eq!(status, StatusCode::OK, "body {raw:?}");
            assert_eq!(body, json!({ "status": "ok" }));
        }
    }

    #[tokio::test]
    async fn test_webhook_fetch_failure_still_acknowledges() {
        let gateway = Arc::new(MockGateway::failing_lookups());
        let app = app_with(gateway.clone());

        let request = post_json(
            "/payment/webhook?type=payment&data.id=123",
            &json!({ "type": "payment", "data": { "id": "123" } }),
        );
        let (status, body) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok" }));
        assert_eq!(gateway.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_webhook_redelivery() {
        let gateway = Arc::new(MockGateway::new());
        let app = app_with(gateway.clone());
        let event = json!({ "type": "payment", "data": { "id": "123" } });

        let first = send(app.clone(), post_json("/payment/webhook", &event)).await;
        let second = send(app, post_json("/payment/webhook", &event)).await;

        assert_eq!(first, second);
        assert_eq!(gateway.lookup_count(), 2);
    }

    #[tokio::test]
    async fn test_legacy_query_notification() {
        let gateway = Arc::new(MockGateway::new());
        let app = app_with(gateway.clone());

        let (status, _) = send(app, post_raw("/payment/webhook?topic=payment&id=77", "")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gateway.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/payment/process")
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5173"
        );
        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
    }
}
