use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, header},
    routing::get,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const PASSWORD: &str = "letmein";

/// A POST the mock received: content type plus raw body.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub content_type: String,
    pub body: Value,
}

/// Stand-in for the spreadsheet web app.
#[derive(Default)]
pub struct MockSheet {
    pub users: Mutex<Vec<Value>>,
    pub fetch_error: Mutex<Option<Value>>,
    pub update_error: Mutex<Option<String>>,
    pub fetches: Mutex<u32>,
    pub posts: Mutex<Vec<RecordedPost>>,
}

impl MockSheet {
    pub fn with_users(users: Value) -> Arc<Self> {
        let sheet = Self::default();
        if let Value::Array(items) = users {
            *sheet.users.lock().unwrap() = items;
        }
        Arc::new(sheet)
    }

    #[allow(dead_code)]
    pub fn user(&self, name: &str) -> Option<Value> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u["username"] == name)
            .cloned()
    }
}

async fn fetch(
    State(sheet): State<Arc<MockSheet>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    *sheet.fetches.lock().unwrap() += 1;
    if params.get("password").map(String::as_str) != Some(PASSWORD) {
        return Json(json!({ "status": "error", "message": "Invalid password" }));
    }
    if let Some(err) = sheet.fetch_error.lock().unwrap().clone() {
        return Json(err);
    }
    Json(Value::Array(sheet.users.lock().unwrap().clone()))
}

async fn update(
    State(sheet): State<Arc<MockSheet>>,
    headers: HeaderMap,
    body: String,
) -> Json<Value> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
    sheet.posts.lock().unwrap().push(RecordedPost {
        content_type,
        body: body.clone(),
    });

    if body["password"] != PASSWORD {
        return Json(json!({ "status": "error", "message": "Invalid password" }));
    }
    if let Some(message) = sheet.update_error.lock().unwrap().clone() {
        return Json(json!({ "status": "error", "message": message }));
    }

    let mut users = sheet.users.lock().unwrap();
    match users
        .iter_mut()
        .find(|u| u["username"] == body["user_affected"])
    {
        Some(user) => {
            user["current_local_points"] = body["new_local"].clone();
            user["current_global_points"] = body["new_global"].clone();
            Json(json!({ "status": "success" }))
        }
        None => Json(json!({ "status": "error", "message": "User not found" })),
    }
}

/// Serves the mock on an ephemeral port and returns its URL.
pub async fn spawn_sheet(sheet: Arc<MockSheet>) -> String {
    let app = Router::new()
        .route("/exec", get(fetch).post(update))
        .with_state(sheet);
    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .expect("bind mock sheet");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{addr}/exec")
}

#[allow(dead_code)]
pub fn unique_path(tag: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!(
        "rewarding_life_{tag}_{}_{nanos}.json",
        std::process::id()
    ));
    path
}
