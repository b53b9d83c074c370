//! In-process chat + Q&A backend for integration tests. Real HTTP on an
//! ephemeral port; handlers record what they received.
#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

pub struct BackendState {
    /// Status for `POST /chat`; anything but 200 returns a plain-text error.
    pub chat_status: u16,
    pub chat_body: Value,
    /// Raw 200 body sent instead of `chat_body` when set.
    pub chat_raw: Option<String>,
    pub chat_requests: Vec<Value>,
    pub records: BTreeMap<u64, (String, String)>,
    pub next_id: u64,
    pub puts: Vec<(u64, Value)>,
}

#[derive(Clone)]
pub struct FakeBackend {
    pub state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn replying(body: Value) -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                chat_status: 200,
                chat_body: body,
                chat_raw: None,
                chat_requests: Vec::new(),
                records: BTreeMap::new(),
                next_id: 1,
                puts: Vec::new(),
            })),
        }
    }

    pub fn failing(status: u16) -> Self {
        let backend = Self::replying(json!({}));
        backend.state.lock().unwrap().chat_status = status;
        backend
    }

    pub fn seed(&self, id: u64, question: &str, answer: &str) {
        let mut s = self.state.lock().unwrap();
        s.records.insert(id, (question.into(), answer.into()));
        s.next_id = s.next_id.max(id + 1);
    }

    pub fn chat_requests(&self) -> Vec<Value> {
        self.state.lock().unwrap().chat_requests.clone()
    }

    pub fn puts(&self) -> Vec<(u64, Value)> {
        self.state.lock().unwrap().puts.clone()
    }

    pub fn record(&self, id: u64) -> Option<(String, String)> {
        self.state.lock().unwrap().records.get(&id).cloned()
    }
}

fn record_json(id: u64, (question, answer): &(String, String)) -> Value {
    json!({"id": id, "question": question, "answer": answer})
}

async fn chat(State(b): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    let mut s = b.state.lock().unwrap();
    s.chat_requests.push(body);
    if s.chat_status != 200 {
        let code = StatusCode::from_u16(s.chat_status).unwrap();
        return (code, "backend failure").into_response();
    }
    match &s.chat_raw {
        Some(raw) => raw.clone().into_response(),
        None => Json(s.chat_body.clone()).into_response(),
    }
}

async fn list(State(b): State<FakeBackend>) -> Json<Vec<Value>> {
    let s = b.state.lock().unwrap();
    Json(s.records.iter().map(|(id, r)| record_json(*id, r)).collect())
}

async fn create(State(b): State<FakeBackend>, Json(body): Json<Value>) -> Json<Value> {
    let mut s = b.state.lock().unwrap();
    let id = s.next_id;
    s.next_id += 1;
    let record = (
        body["question"].as_str().unwrap_or_default().to_string(),
        body["answer"].as_str().unwrap_or_default().to_string(),
    );
    let out = record_json(id, &record);
    s.records.insert(id, record);
    Json(out)
}

async fn get_one(State(b): State<FakeBackend>, Path(id): Path<u64>) -> Response {
    let s = b.state.lock().unwrap();
    match s.records.get(&id) {
        Some(r) => Json(record_json(id, r)).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"detail": "Q&A not found"}))).into_response(),
    }
}

async fn update(
    State(b): State<FakeBackend>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> Response {
    let mut s = b.state.lock().unwrap();
    s.puts.push((id, body.clone()));
    match s.records.get_mut(&id) {
        Some(r) => {
            r.0 = body["question"].as_str().unwrap_or_default().to_string();
            r.1 = body["answer"].as_str().unwrap_or_default().to_string();
            Json(record_json(id, r)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete(State(b): State<FakeBackend>, Path(id): Path<u64>) -> Response {
    let mut s = b.state.lock().unwrap();
    match s.records.remove(&id) {
        Some(_) => Json(json!({"detail": "Deleted"})).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub fn router(backend: FakeBackend) -> Router {
    Router::new()
        .route("/chat", post(chat))
        .route("/qa", get(list).post(create))
        .route("/qa/:id", get(get_one).put(update).delete(delete))
        .with_state(backend)
}

/// Serves on the current runtime; returns the base URL.
pub async fn serve(backend: FakeBackend) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(backend)).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Serves from a background thread with its own runtime (for binary tests).
pub fn serve_in_thread(backend: FakeBackend) -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, router(backend)).await.unwrap();
        });
    });
    format!("http://{}", rx.recv().unwrap())
}

/// A base URL where nothing is listening.
pub fn dead_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
