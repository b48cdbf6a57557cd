//! Router-level tests against the in-memory store.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use chrono::{DateTime, Duration};
use serde_json::{Value, json};
use task_store::{MemoryTaskStore, SqliteTaskStore, TaskStore};
use tasktime_server::{
    config::Config,
    create_app, create_state,
    services::clock::ManualClock,
};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    clock: Arc<ManualClock>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_store(MemoryTaskStore::new())
    }

    fn with_store<S: TaskStore + 'static>(store: S) -> Self {
        let clock = Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ));
        let state = create_state(Config::for_testing("test-secret"), store, clock.clone()).unwrap();
        Self {
            router: create_app(state),
            clock,
        }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({"email": email, "password": "password123", "name": "Tester"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_task(&self, token: &str, title: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/tasks",
                Some(token),
                Some(json!({"title": title})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["task"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn tasks_require_authentication() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::GET, "/api/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
    assert!(body["error"].get("details").is_none());

    let (status, _) = app
        .send(Method::GET, "/api/tasks", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_me() {
    let app = TestApp::new();
    app.register("alice@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "alice@example.com", "password": "password123", "name": "A"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("password").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = app.send(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn stale_token_does_not_block_public_routes() {
    let app = TestApp::new();
    app.register("alice@example.com").await;
    let stale = "stale.expired.token";

    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/login",
            Some(stale),
            Some(json!({"email": "alice@example.com", "password": "password123"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body["token"].is_string());

    let (status, _) = app
        .send(
            Method::POST,
            "/api/auth/register",
            Some(stale),
            Some(json!({"email": "bob@example.com", "password": "password123", "name": "Bob"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let response = app
        .router
        .clone()
        .oneshot(
            Request::get("/health")
                .header(header::AUTHORIZATION, format!("Bearer {}", stale))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = app.send(Method::GET, "/api/auth/me", Some(stale), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn register_validation_details() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({"email": "no-at-sign", "password": "short", "name": ""})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["details"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn create_task_defaults_and_validation() {
    let app = TestApp::new();
    let token = app.register("alice@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "Write README", "description": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["task"]["status"], "PENDING");
    assert_eq!(body["task"]["description"], Value::Null);
    assert!(body["task"]["ownerId"].is_string());
    assert!(body["task"]["createdAt"].is_string());

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({"title": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "title");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "x", "status": "BOGUS"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "status");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "x", "status": null})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "status");

    let (status, body) = app
        .send(Method::POST, "/api/tasks", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn timer_lifecycle_and_totals() {
    let app = TestApp::new();
    let token = app.register("alice@example.com").await;
    let task_id = app.create_task(&token, "Write README").await;
    let start = format!("/api/tasks/{}/timer/start", task_id);
    let stop = format!("/api/tasks/{}/timer/stop", task_id);

    let (status, body) = app.send(Method::POST, &start, Some(&token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["timeLog"]["endTime"], Value::Null);
    assert_eq!(body["timeLog"]["duration"], Value::Null);

    app.clock.advance(Duration::seconds(1));
    let (status, body) = app.send(Method::POST, &start, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    let (status, body) = app
        .send(Method::GET, "/api/timers/active", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeLogs"].as_array().unwrap().len(), 1);

    // Running timers do not count toward the total.
    let (_, body) = app.send(Method::GET, "/api/tasks", Some(&token), None).await;
    assert_eq!(body["tasks"][0]["totalTime"], 0);

    app.clock.advance(Duration::seconds(29));
    let (status, body) = app.send(Method::POST, &stop, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timeLog"]["duration"], 30);

    let (status, _) = app.send(Method::POST, &stop, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.send(Method::GET, "/api/tasks", Some(&token), None).await;
    assert_eq!(body["tasks"][0]["totalTime"], 30);

    let (status, body) = app
        .send(
            Method::GET,
            &format!("/api/tasks/{}/time-logs", task_id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTime"], 30);
    assert_eq!(body["timeLogs"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn tasks_are_scoped_to_owner() {
    let app = TestApp::new();
    let alice = app.register("alice@example.com").await;
    let bob = app.register("bob@example.com").await;
    let task_id = app.create_task(&alice, "Private").await;

    let (_, body) = app.send(Method::GET, "/api/tasks", Some(&bob), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 0);

    for (method, uri) in [
        (Method::GET, format!("/api/tasks/{}", task_id)),
        (Method::DELETE, format!("/api/tasks/{}", task_id)),
        (Method::POST, format!("/api/tasks/{}/timer/start", task_id)),
        (Method::GET, format!("/api/tasks/{}/time-logs", task_id)),
    ] {
        let (status, body) = app.send(method, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }

    let (status, _) = app
        .send(Method::GET, "/api/tasks/not-a-uuid", Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_delete_task() {
    let app = TestApp::new();
    let token = app.register("alice@example.com").await;
    let task_id = app.create_task(&token, "Draft").await;
    let uri = format!("/api/tasks/{}", task_id);

    let (status, body) = app
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"status": "IN_PROGRESS", "description": "Now with details"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "IN_PROGRESS");
    assert_eq!(body["task"]["description"], "Now with details");
    assert_eq!(body["task"]["title"], "Draft");

    let (status, _) = app
        .send(Method::PATCH, &uri, Some(&token), Some(json!({"status": "DONE"})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Deleting cancels the running timer along with the task.
    app.send(
        Method::POST,
        &format!("{}/timer/start", uri),
        Some(&token),
        None,
    )
    .await;
    let (status, _) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, body) = app
        .send(Method::GET, "/api/timers/active", Some(&token), None)
        .await;
    assert_eq!(body["timeLogs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn ai_enhance_falls_back_without_key() {
    let app = TestApp::new();
    let token = app.register("alice@example.com").await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks/ai-enhance",
            Some(&token),
            Some(json!({"userInput": "buy milk"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"title": "Buy milk", "description": null}));

    let (status, body) = app
        .send(
            Method::POST,
            "/api/tasks/ai-enhance",
            Some(&token),
            Some(json!({"userInput": ""})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"][0]["field"], "userInput");

    let (status, _) = app
        .send(
            Method::POST,
            "/api/tasks/ai-enhance",
            None,
            Some(json!({"userInput": "buy milk"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn created_task_reads_back_identically_over_sqlite() {
    let app = TestApp::with_store(SqliteTaskStore::connect("sqlite::memory:").await.unwrap());
    let token = app.register("alice@example.com").await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/tasks",
            Some(&token),
            Some(json!({"title": "Write README"})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let task_id = created["task"]["id"].as_str().unwrap();

    let (status, fetched) = app
        .send(Method::GET, &format!("/api/tasks/{}", task_id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["task"]["createdAt"], created["task"]["createdAt"]);
    assert_eq!(fetched["task"]["updatedAt"], created["task"]["updatedAt"]);
}

#[tokio::test]
async fn concurrent_starts_over_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}?mode=rwc", dir.path().join("api.db").display());
    let app = TestApp::with_store(SqliteTaskStore::connect(&url).await.unwrap());
    let token = app.register("alice@example.com").await;
    let task_id = app.create_task(&token, "Race").await;
    let uri = format!("/api/tasks/{}/timer/start", task_id);

    let (a, b) = tokio::join!(
        app.send(Method::POST, &uri, Some(&token), None),
        app.send(Method::POST, &uri, Some(&token), None),
    );
    let mut statuses = [a.0, b.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}
