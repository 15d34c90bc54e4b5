//! In-process mock of the word repository HTTP API.
//!
//! The mock binds an ephemeral port and speaks the `{code, data, msg}`
//! envelope. Study endpoints require the bearer token handed out by login.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use wordbook_client::{HttpWordRepository, MemorySessionStore, SessionStore, UserSession};

pub const TOKEN: &str = "token-abc";
pub const PASSWORD: &str = "secret";

#[derive(Default)]
pub struct MockRepository {
    pub words: Mutex<Vec<Value>>,
    pub statuses: Mutex<Vec<Value>>,
    pub updates: Mutex<Vec<Value>>,
    pub cleared: Mutex<Vec<String>>,
    pub fail_updates: AtomicBool,
    pub fail_categories: AtomicBool,
    pub update_calls: AtomicUsize,
    pub logouts: AtomicUsize,
}

impl MockRepository {
    /// Three words of a small book; `12` is starred, `13` learned.
    pub fn with_book() -> Arc<Self> {
        let mock = Self::default();
        *mock.words.lock().unwrap() = vec![
            json!({
                "id": 12,
                "english": "abandon",
                "chinese": "v. 放弃",
                "phonetic": "/əˈbændən/"
            }),
            json!({"id": "13", "english": "ability", "chinese": "n. 能力"}),
            json!({
                "id": 14,
                "english": "Able",
                "chinese": "adj. 能够的",
                "sentence": "Able to swim."
            }),
        ];
        *mock.statuses.lock().unwrap() = vec![
            json!({"wordId": 12, "isStarred": true, "isLearned": false}),
            json!({"wordId": "13", "isStarred": false, "isLearned": true, "learningNotes": "noun"}),
        ];
        Arc::new(mock)
    }
}

fn ok(data: Value) -> Response {
    Json(json!({"code": 200, "data": data, "msg": "success"})).into_response()
}

fn failure(code: i64, msg: &str) -> Response {
    Json(json!({"code": code, "data": null, "msg": msg})).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(format!("Bearer {}", TOKEN).as_str())
}

async fn categories(State(mock): State<Arc<MockRepository>>) -> Response {
    if mock.fail_categories.load(Ordering::SeqCst) {
        return failure(500, "categories offline");
    }
    ok(json!([{"id": 3, "name": "雅思"}]))
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == PASSWORD {
        ok(json!({"token": TOKEN, "username": body["username"], "userId": 42}))
    } else {
        failure(400, "用户名或密码错误")
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["activationCode"].is_string() {
        ok(json!({"token": TOKEN, "username": body["username"], "userId": 43}))
    } else {
        failure(400, "missing activation code")
    }
}

async fn logout(State(mock): State<Arc<MockRepository>>) -> Response {
    mock.logouts.fetch_add(1, Ordering::SeqCst);
    ok(Value::Null)
}

async fn words(
    State(mock): State<Arc<MockRepository>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    if query.get("bookId").map(String::as_str) != Some("cet4-core") {
        return failure(404, "no such book");
    }
    ok(Value::Array(mock.words.lock().unwrap().clone()))
}

async fn statuses(State(mock): State<Arc<MockRepository>>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    ok(Value::Array(mock.statuses.lock().unwrap().clone()))
}

async fn update_statuses(
    State(mock): State<Arc<MockRepository>>,
    headers: HeaderMap,
    Json(batch): Json<Vec<Value>>,
) -> Response {
    if !authorized(&headers) {
        return failure(401, "token expired");
    }
    mock.update_calls.fetch_add(1, Ordering::SeqCst);
    if mock.fail_updates.load(Ordering::SeqCst) {
        return failure(500, "boom");
    }
    mock.updates.lock().unwrap().extend(batch);
    ok(Value::Null)
}

async fn clear_record(
    State(mock): State<Arc<MockRepository>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return failure(401, "token expired");
    }
    let book_id = body["bookId"].as_str().unwrap_or_default().to_string();
    mock.cleared.lock().unwrap().push(book_id);
    mock.statuses.lock().unwrap().clear();
    ok(Value::Null)
}

/// Serve the mock and return its base URL.
pub async fn spawn(mock: Arc<MockRepository>) -> String {
    let app = Router::new()
        .route("/api/categories", get(categories))
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/logout", post(logout))
        .route("/api/words", get(words))
        .route("/api/study/status", get(statuses).post(update_statuses))
        .route("/api/study/clear", post(clear_record))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock repository");
    let addr = listener.local_addr().expect("mock address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("mock repository");
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("address");
    drop(listener);
    format!("http://{}", addr)
}

pub fn logged_in() -> Arc<dyn SessionStore> {
    Arc::new(MemorySessionStore::with_user(UserSession {
        token: TOKEN.to_string(),
        username: "alice".to_string(),
        user_id: 42,
    }))
}

pub fn client(base_url: &str, session: Arc<dyn SessionStore>) -> HttpWordRepository {
    HttpWordRepository::new(base_url, Duration::from_secs(5), session).expect("client")
}
