use proctoring_backend::services::notifier::{Notifier, PushGatewayNotifier};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn publish_wraps_payload_with_channel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .and(body_json(json!({
            "channel": "abc123",
            "data": { "hash": "h1", "status": "submitted" },
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = PushGatewayNotifier::new(format!("{}/publish", server.uri()));
    notifier
        .publish("abc123", &json!({ "hash": "h1", "status": "submitted" }))
        .await
        .unwrap();
}

#[tokio::test]
async fn gateway_rejection_does_not_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/publish"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let notifier = PushGatewayNotifier::new(format!("{}/publish", server.uri()));
    notifier
        .publish("abc123", &json!({ "hash": "h1", "status": "OK" }))
        .await
        .unwrap();
}
