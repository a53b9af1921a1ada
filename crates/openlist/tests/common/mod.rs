//! In-process mock of the OpenList API for integration tests
#![allow(dead_code)]

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use futures::StreamExt;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use ol_core::{ServerConfig, Timeouts};
use ol_openlist::OpenListClient;

pub const TOKEN: &str = "tok-7f3a";
pub const PASSWORD: &str = "secret";

/// Gap between the chunks of `/d/slow` and the delay of `/slow*` uploads
pub const SLOW_STEP: Duration = Duration::from_millis(700);

/// Bytes served for `/files/blob.bin`
pub fn blob() -> Vec<u8> {
    (0..200_000u32).map(|i| (i % 251) as u8).collect()
}

#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub file_path: String,
    pub authorization: Option<String>,
    pub content_type: String,
    pub field: String,
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Clone, Default)]
pub struct MockState {
    pub logins: Arc<AtomicUsize>,
    pub dirs: Arc<Mutex<BTreeSet<String>>>,
    pub mkdir_calls: Arc<Mutex<Vec<String>>>,
    pub created: Arc<Mutex<Vec<String>>>,
    pub removes: Arc<Mutex<Vec<Value>>>,
    pub uploads: Arc<Mutex<Vec<UploadRecord>>>,
    pub download_auth: Arc<Mutex<Vec<Option<String>>>>,
}

impl MockState {
    pub fn login_count(&self) -> usize {
        self.logins.load(Ordering::SeqCst)
    }
}

fn ok(data: Value) -> Response {
    axum::Json(json!({"code": 200, "message": "success", "data": data})).into_response()
}

fn fail(code: i64, message: &str) -> Response {
    axum::Json(json!({"code": code, "message": message, "data": null})).into_response()
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some(TOKEN)
}

fn host_base(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("127.0.0.1");
    format!("http://{host}")
}

async fn login(State(state): State<MockState>, axum::Json(body): axum::Json<Value>) -> Response {
    // Long enough for concurrent callers to pile up behind the first login
    tokio::time::sleep(Duration::from_millis(50)).await;
    if body["password"] == PASSWORD {
        state.logins.fetch_add(1, Ordering::SeqCst);
        ok(json!({"token": TOKEN}))
    } else {
        fail(400, "password is incorrect")
    }
}

async fn list(
    State(state): State<MockState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return fail(401, "token is invalid");
    }
    let path = body["path"].as_str().unwrap_or_default().to_string();
    if path == "/broken" {
        return fail(500, "disk full");
    }
    // `/ghost*` directories exist but never show up in a listing
    let visible = path == "/" || state.dirs.lock().unwrap().contains(&path);
    if path.starts_with("/ghost") || !visible {
        return fail(500, "object not found");
    }
    ok(json!({
        "content": [
            {"name": "a.txt", "size": 3, "is_dir": false, "modified": "2024-01-01T00:00:00Z", "sign": "", "thumb": "", "type": 0},
            {"name": "sub", "size": 0, "is_dir": true, "modified": "2024-01-02T00:00:00Z", "sign": "", "thumb": "", "type": 1}
        ],
        "total": 2,
        "readme": "",
        "write": true,
        "provider": "Local",
    }))
}

async fn mkdir(
    State(state): State<MockState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return fail(401, "token is invalid");
    }
    let path = body["path"].as_str().unwrap_or_default().to_string();
    state.mkdir_calls.lock().unwrap().push(path.clone());
    if path.starts_with("/locked") {
        return fail(403, "permission denied");
    }
    let mut dirs = state.dirs.lock().unwrap();
    if !dirs.insert(path.clone()) {
        return fail(500, "mkdir failed: file already exists");
    }
    state.created.lock().unwrap().push(path);
    ok(Value::Null)
}

async fn get_info(headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    if !authorized(&headers) {
        return fail(401, "token is invalid");
    }
    let base = host_base(&headers);
    let size = blob().len();
    match body["path"].as_str().unwrap_or_default() {
        "/files/blob.bin" => ok(json!({
            "name": "blob.bin", "size": size, "is_dir": false,
            "modified": "2024-03-01T10:00:00+08:00",
            "raw_url": format!("{base}/d/files/blob.bin"), "sign": "s1", "thumb": "", "type": 0
        })),
        "/files/nosize.bin" => ok(json!({
            "name": "nosize.bin", "size": 0, "is_dir": false,
            "raw_url": format!("{base}/d/files/blob.bin")
        })),
        "/files/chunked.bin" => ok(json!({
            "name": "chunked.bin", "size": 0, "is_dir": false,
            "raw_url": format!("{base}/d/chunked")
        })),
        "/files/gone.bin" => ok(json!({
            "name": "gone.bin", "size": 10, "is_dir": false,
            "raw_url": format!("{base}/d/gone")
        })),
        "/files/slow.bin" => ok(json!({
            "name": "slow.bin", "size": 3000, "is_dir": false,
            "raw_url": format!("{base}/d/slow")
        })),
        "/files/nolink.bin" => ok(json!({"name": "nolink.bin", "size": 10, "is_dir": false})),
        _ => fail(500, "object not found"),
    }
}

async fn search(headers: HeaderMap, axum::Json(body): axum::Json<Value>) -> Response {
    if !authorized(&headers) {
        return fail(401, "token is invalid");
    }
    ok(json!({
        "content": [
            {"parent": body["parent"], "name": format!("{}.txt", body["keywords"].as_str().unwrap_or("")), "is_dir": false, "size": 12, "type": 4}
        ],
        "total": 1,
    }))
}

async fn remove(
    State(state): State<MockState>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return fail(401, "token is invalid");
    }
    state.removes.lock().unwrap().push(body);
    ok(Value::Null)
}

async fn upload(State(state): State<MockState>, headers: HeaderMap, mut multipart: Multipart) -> Response {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let file_path = header_str("file-path").unwrap_or_default();

    let mut record = UploadRecord {
        file_path: file_path.clone(),
        authorization: header_str("authorization"),
        content_type: header_str("content-type").unwrap_or_default(),
        field: String::new(),
        file_name: String::new(),
        content: Vec::new(),
    };
    while let Some(field) = multipart.next_field().await.unwrap() {
        record.field = field.name().unwrap_or_default().to_string();
        record.file_name = field.file_name().unwrap_or_default().to_string();
        record.content = field.bytes().await.unwrap().to_vec();
    }
    state.uploads.lock().unwrap().push(record);

    if file_path.starts_with("/readonly") {
        return fail(403, "permission denied");
    }
    if file_path.starts_with("/slow") {
        tokio::time::sleep(SLOW_STEP * 2).await;
    }
    if file_path.starts_with("/proxyfail") {
        return (StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").into_response();
    }
    ok(Value::Null)
}

async fn raw_blob(State(state): State<MockState>, headers: HeaderMap) -> Response {
    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.download_auth.lock().unwrap().push(auth);
    (StatusCode::OK, blob()).into_response()
}

async fn raw_chunked() -> Response {
    let chunks: Vec<Result<Bytes, std::io::Error>> = (0..4)
        .map(|i| Ok(Bytes::from(vec![i as u8; 1000])))
        .collect();
    Body::from_stream(futures::stream::iter(chunks)).into_response()
}

async fn raw_slow() -> Response {
    let chunks = futures::stream::iter(0..3u8).then(|i| async move {
        tokio::time::sleep(SLOW_STEP).await;
        Ok::<_, std::io::Error>(Bytes::from(vec![i; 1000]))
    });
    Body::from_stream(chunks).into_response()
}

async fn raw_gone() -> Response {
    (StatusCode::NOT_FOUND, "gone").into_response()
}

async fn echo_headers(headers: HeaderMap) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    ok(json!({"content_type": content_type, "authorization": authorization}))
}

async fn success_body_bad_status() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        axum::Json(json!({"code": 200, "message": "success", "data": null})),
    )
        .into_response()
}

async fn not_json() -> Response {
    (StatusCode::OK, "<html>maintenance</html>").into_response()
}

pub async fn start_server(state: MockState) -> (String, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/fs/list", post(list))
        .route("/api/fs/mkdir", post(mkdir))
        .route("/api/fs/get", post(get_info))
        .route("/api/fs/search", post(search))
        .route("/api/fs/remove", post(remove))
        .route("/api/fs/form", put(upload))
        .route("/d/files/blob.bin", get(raw_blob))
        .route("/d/chunked", get(raw_chunked))
        .route("/d/slow", get(raw_slow))
        .route("/d/gone", get(raw_gone))
        .route("/echo", post(echo_headers))
        .route("/bad-status", post(success_body_bad_status))
        .route("/not-json", post(not_json))
        .with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), handle)
}

pub fn client(base_url: &str) -> OpenListClient {
    client_with_password(base_url, PASSWORD)
}

pub fn client_with_password(base_url: &str, password: &str) -> OpenListClient {
    let server = ServerConfig::new(base_url, "admin", password);
    OpenListClient::new(&server, &Timeouts::default()).unwrap()
}

/// A client whose JSON requests give up after one second
pub fn impatient_client(base_url: &str) -> OpenListClient {
    let server = ServerConfig::new(base_url, "admin", PASSWORD);
    let timeouts = Timeouts {
        request_secs: 1,
        upload_secs: 5,
        download_secs: 5,
        ..Timeouts::default()
    };
    OpenListClient::new(&server, &timeouts).unwrap()
}
