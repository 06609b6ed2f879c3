use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use httpmock::{Method::POST, MockServer};
use rusty_students::{
    api::{AppState, create_router},
    store::StudentStore,
    summary::OllamaSummaryClient,
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct Harness {
    app: Router,
    store: Arc<StudentStore>,
}

impl Harness {
    fn new(ollama_url: String, timeout: Duration) -> Self {
        let store = Arc::new(StudentStore::new());
        let summarizer =
            OllamaSummaryClient::new(ollama_url, "llama2", timeout).expect("ollama client");
        let app = create_router(AppState::new(store.clone(), Arc::new(summarizer)));
        Self { app, store }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = self
            .app
            .clone()
            .oneshot(request.body(body).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let value = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
        (status, value)
    }
}

#[tokio::test]
async fn crud_lifecycle_round_trip() {
    let harness = Harness::new("http://127.0.0.1:9".into(), Duration::from_secs(1));

    let (status, created) = harness
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Ada", "age": 30, "email": "a@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created,
        json!({ "id": 1, "name": "Ada", "age": 30, "email": "a@x.com" })
    );

    let (status, fetched) = harness.call(Method::GET, "/students/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, updated) = harness
        .call(
            Method::PUT,
            "/students/1",
            Some(json!({ "id": 12, "name": "Ada Lovelace", "age": 36, "email": "ada@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], 1);
    assert_eq!(updated["name"], "Ada Lovelace");

    let (status, listed) = harness.call(Method::GET, "/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed, json!([updated]));

    let (status, _) = harness.call(Method::DELETE, "/students/1", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, message) = harness.call(Method::GET, "/students/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(message, json!("Student not found"));

    let (status, recreated) = harness
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Grace", "age": 45, "email": "g@x.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(recreated["id"], 2);
}

#[tokio::test]
async fn summary_uses_ollama_chat_reply() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/chat")
                .body_contains("Name: Ada")
                .body_contains("Age: 30")
                .body_contains("Email: a@x.com");
            then.status(200).json_body(json!({
                "message": { "role": "assistant", "content": "Ada is 30 and studies maths." },
                "done": true
            }));
        })
        .await;
    let harness = Harness::new(server.base_url(), Duration::from_secs(5));

    harness
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Ada", "age": 30, "email": "a@x.com" })),
        )
        .await;
    let (status, body) = harness.call(Method::GET, "/students/1/summary", None).await;

    mock.assert_async().await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "summary": "Ada is 30 and studies maths." }));
}

#[tokio::test]
async fn summary_downstream_failures_are_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200).body("<html>not json</html>");
        })
        .await;
    let harness = Harness::new(server.base_url(), Duration::from_secs(5));
    harness
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Ada", "age": 30, "email": "a@x.com" })),
        )
        .await;
    let (status, _) = harness.call(Method::GET, "/students/1/summary", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let offline = Harness::new(format!("http://{addr}"), Duration::from_secs(2));
    offline
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Ada", "age": 30, "email": "a@x.com" })),
        )
        .await;
    let (status, _) = offline.call(Method::GET, "/students/1/summary", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn slow_summary_does_not_block_the_store() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat");
            then.status(200)
                .delay(Duration::from_millis(500))
                .json_body(json!({ "message": { "content": "eventually" } }));
        })
        .await;
    let harness = Arc::new(Harness::new(server.base_url(), Duration::from_secs(5)));
    harness
        .call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Ada", "age": 30, "email": "a@x.com" })),
        )
        .await;

    let pending = {
        let harness = Arc::clone(&harness);
        tokio::spawn(async move { harness.call(Method::GET, "/students/1/summary", None).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;

    let write = tokio::time::timeout(
        Duration::from_millis(250),
        harness.call(
            Method::POST,
            "/students",
            Some(json!({ "name": "Grace", "age": 45, "email": "g@x.com" })),
        ),
    )
    .await
    .expect("create completes while summary is in flight");
    assert_eq!(write.0, StatusCode::CREATED);

    let (status, body) = pending.await.expect("join");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "eventually");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_receive_unique_ids() {
    let harness = Arc::new(Harness::new("http://127.0.0.1:9".into(), Duration::from_secs(1)));
    let tasks: Vec<_> = (0..32)
        .map(|n| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move {
                harness
                    .call(
                        Method::POST,
                        "/students",
                        Some(json!({ "name": format!("s{n}"), "age": 20, "email": "s@x.com" })),
                    )
                    .await
            })
        })
        .collect();

    let mut ids = Vec::new();
    for task in tasks {
        let (status, body) = task.await.expect("join");
        assert_eq!(status, StatusCode::CREATED);
        ids.push(body["id"].as_u64().expect("id"));
    }
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids, (1..=32).collect::<Vec<u64>>());
    assert_eq!(harness.store.len().await, 32);
}
