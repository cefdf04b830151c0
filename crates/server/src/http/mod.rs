use axum::{
    Router,
    http::{Method, header},
    routing::get,
};
use tower_http::cors::{Any, CorsLayer};

use crate::{routes, state::AppState};

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(routes::charges::router())
        .merge(routes::webhooks::router());

    // The checkout frontend is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use config::{Config, DEFAULT_GATEWAY_BASE_URL, GatewayConfig};
    use gateway::GatewayClient;
    use hmac::{Hmac, Mac};
    use ingest::{
        BoundedDedupCache, DedupStore, Ingestor, PaymentHooks, RecordingHooks, StatusClass,
    };
    use secrecy::SecretString;
    use serde_json::json;
    use sha2::Sha256;
    use tower::ServiceExt;

    use crate::state::AppState;

    struct TestApp {
        router: axum::Router,
        hooks: Arc<RecordingHooks>,
        store: Arc<BoundedDedupCache>,
    }

    fn test_config(with_gateway_keys: bool) -> Config {
        Config {
            gateway: GatewayConfig {
                base_url: DEFAULT_GATEWAY_BASE_URL.to_string(),
                public_key: with_gateway_keys.then(|| "pk_test".to_string()),
                secret_key: with_gateway_keys.then(|| SecretString::from("sk_test")),
                webhook_url: None,
            },
            webhook_secret: None,
            host: "127.0.0.1".to_string(),
            port: 0,
        }
    }

    fn test_app(webhook_secret: Option<&str>, with_gateway_keys: bool) -> TestApp {
        let config = test_config(with_gateway_keys);
        let gateway = GatewayClient::from_config(&config.gateway)
            .ok()
            .map(Arc::new);

        let hooks = Arc::new(RecordingHooks::default());
        let store = Arc::new(BoundedDedupCache::default());
        let ingestor = Arc::new(Ingestor::new(
            webhook_secret.map(SecretString::from),
            Arc::clone(&store) as Arc<dyn DedupStore>,
            Arc::clone(&hooks) as Arc<dyn PaymentHooks>,
        ));

        let state = AppState::from_parts(Arc::new(config), gateway, ingestor);
        TestApp {
            router: super::router(state),
            hooks,
            store,
        }
    }

    fn webhook_request(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/webhooks/payments")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn sign(secret: &str, body: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        hex::encode(mac.finalize().into_bytes())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_is_public() {
        let app = test_app(None, false);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn paid_webhook_is_acknowledged_and_dispatched_once() {
        let app = test_app(None, false);
        let body = json!({
            "id": "tx_1",
            "status": "PAID",
            "amount": 2990,
            "metadata": {"order_id": "ord_7"}
        })
        .to_string();

        let response = app.router.oneshot(webhook_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["received"], true);
        assert_eq!(json["processed"], true);

        let dispatches = app.hooks.dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].0, StatusClass::Paid);
        assert_eq!(dispatches[0].1.amount_cents, Some(2990));
    }

    #[tokio::test]
    async fn duplicate_delivery_acknowledges_without_redispatch() {
        let app = test_app(None, false);
        let body = json!({"id": "tx_1", "status": "PAID", "amount": 2990}).to_string();

        let first = app
            .router
            .clone()
            .oneshot(webhook_request(&body))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::OK);

        let second = app.router.oneshot(webhook_request(&body)).await.unwrap();
        assert_eq!(second.status(), StatusCode::OK);

        let json = body_json(second).await;
        assert_eq!(json["received"], true);
        assert_eq!(json["processed"], true);
        assert_eq!(app.hooks.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn pascal_case_refusal_classifies_as_failed() {
        let app = test_app(None, false);
        let body = json!({"Status": "REFUSED", "Id": "tx_2"}).to_string();

        let response = app.router.oneshot(webhook_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let dispatches = app.hooks.dispatches();
        assert_eq!(dispatches.len(), 1);
        assert_eq!(dispatches[0].0, StatusClass::Failed);
        assert_eq!(dispatches[0].1.event_id.as_deref(), Some("tx_2"));
    }

    #[tokio::test]
    async fn webhook_rejects_non_post_without_touching_state() {
        let app = test_app(None, false);
        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri("/api/webhooks/payments")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(app.hooks.dispatch_count(), 0);
        assert_eq!(app.store.len(), 0);
    }

    #[tokio::test]
    async fn webhook_with_wrong_signature_is_unauthorized() {
        let app = test_app(Some("s3cr3t"), false);
        let body = r#"{"id":"abc"}"#;

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/payments")
                    .header("x-anubis-signature", "deadbeef")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(app.hooks.dispatch_count(), 0);
        assert_eq!(app.store.len(), 0);
    }

    #[tokio::test]
    async fn webhook_with_valid_signature_is_processed() {
        let app = test_app(Some("s3cr3t"), false);
        let body = json!({"id": "tx_signed", "status": "PAID"}).to_string();
        let signature = sign("s3cr3t", body.as_bytes());

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/webhooks/payments")
                    .header("x-signature", signature)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.hooks.dispatch_count(), 1);
    }

    #[tokio::test]
    async fn malformed_webhook_body_is_bad_request() {
        let app = test_app(None, false);
        let response = app
            .router
            .oneshot(webhook_request("this is not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(app.hooks.dispatch_count(), 0);
    }

    #[tokio::test]
    async fn charge_creation_requires_gateway_keys() {
        let app = test_app(None, false);
        let body = json!({
            "amount": 29.9,
            "customer": {
                "name": "Maria",
                "email": "maria@example.com",
                "phone": "11999999999",
                "cpf": "529.982.247-25"
            }
        })
        .to_string();

        let response = app
            .router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/charges")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["message"], "System configuration incomplete");
    }

    #[tokio::test]
    async fn charge_creation_validates_input_before_calling_out() {
        let app = test_app(None, true);

        let cases = [
            (json!({"amount": 0.5, "customer": {"name": "M", "email": "m@example.com", "phone": "11999999999", "cpf": "529.982.247-25"}}), "Minimum amount is R$ 1.00"),
            (json!({"amount": 29.9, "customer": {"name": "M", "email": "m@example.com", "phone": "123", "cpf": "529.982.247-25"}}), "Invalid phone. Use area code + number (e.g. 11999999999)"),
            (json!({"amount": 29.9, "customer": {"name": "M", "email": "m@example.com", "phone": "11999999999", "cpf": "123.456.789-00"}}), "Invalid CPF. Please provide a valid CPF."),
            (json!({"amount": 29.9, "customer": {"name": "M", "email": "not-an-email", "phone": "11999999999", "cpf": "529.982.247-25"}}), "Invalid e-mail. Provide a valid e-mail address."),
        ];

        for (body, expected_message) in cases {
            let response = app
                .router
                .clone()
                .oneshot(
                    Request::builder()
                        .method("POST")
                        .uri("/api/charges")
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from(body.to_string()))
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let json = body_json(response).await;
            assert_eq!(json["success"], false);
            assert_eq!(json["message"], expected_message);
        }
    }
}
