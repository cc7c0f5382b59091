use proctoring_backend::error::Error;
use proctoring_backend::services::platform_client::{HttpPlatformClient, PlatformClient};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client_for(server: &MockServer) -> HttpPlatformClient {
    HttpPlatformClient::new(&format!("{}/", server.uri()), "test-token".to_string())
        .expect("client")
}

#[tokio::test]
async fn start_exam_surfaces_upstream_status_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/exams/EXAM-1/start"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.start_exam("EXAM-1").await.unwrap(), 200);
}

#[tokio::test]
async fn start_exam_does_not_mask_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/exams/EXAM-1/start"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.start_exam("EXAM-1").await.unwrap(), 403);
}

#[tokio::test]
async fn stop_exam_sends_action_and_user_id() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/exams/EXAM-1/stop"))
        .and(body_json(json!({ "action": "submit", "user_id": "42" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.stop_exam("EXAM-1", "submit", "42").await.unwrap(), 200);
}

#[tokio::test]
async fn poll_statuses_parses_attempt_updates() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/exams/status"))
        .and(body_json(json!({ "list": ["A", "B"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "attempt_code": "A", "status": "verified" },
            { "attempt_code": "B", "status": "submitted" },
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let updates = client
        .poll_statuses(&["A".to_string(), "B".to_string()])
        .await
        .unwrap();
    assert_eq!(updates.len(), 2);
    assert_eq!(updates[0].attempt_code, "A");
    assert_eq!(updates[0].status, "verified");
    assert_eq!(updates[1].status, "submitted");
}

#[tokio::test]
async fn poll_statuses_failure_is_an_upstream_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/exams/status"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.poll_statuses(&["A".to_string()]).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { status: 502, .. }));
}

#[tokio::test]
async fn bulk_start_returns_started_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/exams/bulk_start"))
        .and(body_json(json!({ "list": ["A", "B"] })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "started": ["A"] })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let started = client
        .bulk_start(&["A".to_string(), "B".to_string()])
        .await
        .unwrap();
    assert_eq!(started, vec!["A".to_string()]);
}

#[tokio::test]
async fn send_review_posts_payload_and_returns_status() {
    let server = MockServer::start().await;
    let payload = json!({
        "examMetaData": { "examCode": "A", "ssiRecordLocator": "abc", "reviewerNotes": "" },
        "reviewStatus": "Clean",
        "videoReviewLink": "http://video.url",
        "desktopComments": [],
    });
    Mock::given(method("POST"))
        .and(path("/api/reviews"))
        .and(body_json(payload.clone()))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.send_review(&payload).await.unwrap(), 201);
}

#[tokio::test]
async fn proctored_exams_returns_catalogue_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/exams/proctored"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "id": "course-a", "proctored_exams": [{}] }]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let catalogue = client.proctored_exams().await.unwrap();
    assert_eq!(catalogue["results"][0]["id"], "course-a");
}
