//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use lastword_core::clock::Clock;
use lastword_core::notify::NullNotifier;
use lastword_core::rng::DeterministicRng;
use lastword_test_support::fixtures::{fixed_now, seed_words};
use lastword_test_support::{FixedClock, MemoryStore, SequenceRng};
use tower::ServiceExt;
use uuid::Uuid;

use lastword_api::routes;
use lastword_api::state::AppState;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock + Send + Sync> {
    Arc::new(FixedClock(fixed_now()))
}

/// Build the full app router over an in-memory store with deterministic
/// Clock/RNG, pre-seeded with enough active words for any room size. Uses
/// the same route structure as `main.rs`. The store handle is returned so
/// tests can inspect state the API deliberately hides.
pub async fn build_test_app() -> (Router, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    seed_words(&store, 30).await;

    let rng: Arc<Mutex<dyn DeterministicRng + Send>> =
        Arc::new(Mutex::new(SequenceRng::cycling(vec![5, 11, 2, 17, 23, 3, 8, 29])));
    let app_state = AppState::new(
        store.clone(),
        fixed_clock(),
        rng,
        Arc::new(NullNotifier),
    );

    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/rooms", routes::rooms::router())
        .nest("/api/v1", routes::eliminations::router())
        .nest("/api/v1/users", routes::users::router())
        .with_state(app_state);
    (app, store)
}

async fn collect_json(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };
    (status, json)
}

/// Send a POST request with a JSON body as the given user.
pub async fn post_json_as(
    app: Router,
    user_id: Uuid,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-user-id", user_id.to_string())
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    collect_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request as the given user.
pub async fn get_json_as(app: Router, user_id: Uuid, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .body(Body::empty())
        .unwrap();

    collect_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request as the given user with an explicit role header.
pub async fn get_json_with_role(
    app: Router,
    user_id: Uuid,
    role: &str,
    uri: &str,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-user-id", user_id.to_string())
        .header("x-user-role", role)
        .body(Body::empty())
        .unwrap();

    collect_json(app.oneshot(request).await.unwrap()).await
}

/// Send a GET request without identity headers.
pub async fn get_json_anonymous(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    collect_json(app.oneshot(request).await.unwrap()).await
}
