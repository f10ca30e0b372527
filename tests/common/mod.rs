// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use waypoint_tracker::auth::{Claims, Session};
use waypoint_tracker::config::Config;
use waypoint_tracker::models::{Course, StopSpec};
use waypoint_tracker::sync::HttpSync;

/// Credentials the fake backend accepts.
#[allow(dead_code)]
pub const TEST_EMAIL: &str = "walker@example.com";
#[allow(dead_code)]
pub const TEST_PASSWORD: &str = "hunter2";

/// Build a JWT the way the backend would issue it.
#[allow(dead_code)]
pub fn test_jwt(member_id: &str, expires_in_secs: i64) -> String {
    let claims = Claims {
        sub: Some(member_id.to_string()),
        exp: Some(chrono::Utc::now().timestamp() + expires_in_secs),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"fake-backend-secret"),
    )
    .expect("Failed to encode test JWT")
}

/// A course with `stops` numbered stops.
#[allow(dead_code)]
pub fn test_course(id: &str, stops: usize) -> Arc<Course> {
    let specs = (0..stops)
        .map(|i| StopSpec {
            id: format!("{}-stop-{}", id, i),
            name: format!("Stop {}", i + 1),
            address: String::new(),
        })
        .collect();
    Arc::new(Course::new(id, "Test course", "", specs).expect("Failed to build test course"))
}

/// State of the in-process REST backend.
#[derive(Default)]
pub struct FakeBackend {
    token: String,
    /// "places/42/favorite" -> value
    flags: Mutex<HashMap<String, bool>>,
    reviews: Mutex<HashMap<String, Vec<Value>>>,
    events: Mutex<Vec<Value>>,
    failing: AtomicBool,
    requests: AtomicUsize,
}

#[allow(dead_code)]
impl FakeBackend {
    pub fn flag(&self, path: &str) -> bool {
        self.flags.lock().unwrap().get(path).copied().unwrap_or(false)
    }

    pub fn set_flag(&self, path: &str, value: bool) {
        self.flags.lock().unwrap().insert(path.to_string(), value);
    }

    pub fn seed_review(&self, entity_path: &str, review: Value) {
        self.reviews
            .lock()
            .unwrap()
            .entry(entity_path.to_string())
            .or_default()
            .push(review);
    }

    pub fn events(&self) -> Vec<Value> {
        self.events.lock().unwrap().clone()
    }

    /// Answer every non-login request with a 500 while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

/// A running fake backend.
#[allow(dead_code)]
pub struct TestServer {
    pub base_url: String,
    pub backend: Arc<FakeBackend>,
    pub token: String,
}

#[allow(dead_code)]
impl TestServer {
    /// `HttpSync` pointed at this server, signed in with its token.
    pub fn client(&self) -> (HttpSync, Arc<Session>) {
        self.client_with_session(Arc::new(Session::with_token(self.token.as_str())))
    }

    pub fn client_with_session(&self, session: Arc<Session>) -> (HttpSync, Arc<Session>) {
        let config = Config {
            api_base_url: self.base_url.clone(),
            ..Config::test_default()
        };
        let sync = HttpSync::new(&config, session.clone()).expect("Failed to build HttpSync");
        (sync, session)
    }
}

/// Start the fake backend on an ephemeral port.
#[allow(dead_code)]
pub async fn spawn_backend() -> TestServer {
    let token = test_jwt("member-1", 3600);
    let backend = Arc::new(FakeBackend {
        token: token.clone(),
        ..FakeBackend::default()
    });

    let app = Router::new()
        .route("/api/members/login", post(login))
        .route(
            "/{collection}/{id}/{action}",
            get(read_action).post(write_action).delete(clear_action),
        )
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    TestServer {
        base_url: format!("http://{}", addr),
        backend,
        token,
    }
}

type Backend = State<Arc<FakeBackend>>;

fn check(backend: &FakeBackend, headers: &HeaderMap) -> Result<(), Response> {
    backend.requests.fetch_add(1, Ordering::SeqCst);

    let expected = format!("Bearer {}", backend.token);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == expected)
        .unwrap_or(false);
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED.into_response());
    }
    if backend.failing.load(Ordering::SeqCst) {
        return Err((StatusCode::INTERNAL_SERVER_ERROR, "backend down").into_response());
    }
    Ok(())
}

async fn login(State(backend): Backend, Json(body): Json<Value>) -> Response {
    if body["email"] == TEST_EMAIL && body["password"] == TEST_PASSWORD {
        Json(json!({ "token": backend.token, "role": "RESIDENT" })).into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn read_action(
    State(backend): Backend,
    headers: HeaderMap,
    Path((collection, id, action)): Path<(String, String, String)>,
) -> Response {
    if let Err(response) = check(&backend, &headers) {
        return response;
    }
    let entity = format!("{}/{}", collection, id);

    match action.as_str() {
        "reviews" => {
            let reviews = backend.reviews.lock().unwrap();
            Json(reviews.get(&entity).cloned().unwrap_or_default()).into_response()
        }
        "favorite" => {
            let value = backend.flag(&format!("{}/favorite", entity));
            Json(json!({ "isFavorite": value })).into_response()
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn write_action(
    State(backend): Backend,
    headers: HeaderMap,
    Path((collection, id, action)): Path<(String, String, String)>,
    body: Bytes,
) -> Response {
    if let Err(response) = check(&backend, &headers) {
        return response;
    }
    let entity = format!("{}/{}", collection, id);

    match action.as_str() {
        "reviews" => {
            let Ok(submitted) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            let mut reviews = backend.reviews.lock().unwrap();
            let list = reviews.entry(entity).or_default();
            let stored = json!({
                "id": format!("srv-{}", list.len() + 1),
                "userId": "member-1",
                "userName": "Walker",
                "rating": submitted["rating"],
                "comment": submitted["comment"],
                "createdAt": chrono::Utc::now().to_rfc3339(),
                "images": submitted["imageUrls"],
            });
            list.push(stored.clone());
            (StatusCode::CREATED, Json(stored)).into_response()
        }
        "events" => {
            let Ok(mut event) = serde_json::from_slice::<Value>(&body) else {
                return StatusCode::BAD_REQUEST.into_response();
            };
            event["courseId"] = json!(id);
            backend.events.lock().unwrap().push(event);
            StatusCode::NO_CONTENT.into_response()
        }
        flag => {
            backend.set_flag(&format!("{}/{}", entity, flag), true);
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

async fn clear_action(
    State(backend): Backend,
    headers: HeaderMap,
    Path((collection, id, action)): Path<(String, String, String)>,
) -> Response {
    if let Err(response) = check(&backend, &headers) {
        return response;
    }
    backend.set_flag(&format!("{}/{}/{}", collection, id, action), false);
    StatusCode::NO_CONTENT.into_response()
}
