//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use fitness_tracker::client::FitnessClient;
use fitness_tracker::lifecycle::prepare_store;
use fitness_tracker::{HttpServer, RecordStore, Shutdown, TrackerConfig};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// A running server on an ephemeral port.
pub struct TestServer {
    pub url: String,
    pub shutdown: Shutdown,
    pub store: Arc<RecordStore>,
}

impl TestServer {
    pub fn client(&self) -> FitnessClient {
        FitnessClient::with_client(http_client(), &self.url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}

/// Start the API with `config`, bound to 127.0.0.1 on a free port.
pub async fn spawn_server(mut config: TrackerConfig) -> TestServer {
    config.listener.bind_address = "127.0.0.1:0".into();

    let store = prepare_store(&config).await.unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestServer {
        url: format!("http://{}", addr),
        shutdown,
        store,
    }
}

/// In-memory stand-in for the GitHub Contents API of one repository.
#[derive(Default)]
pub struct MockRepo {
    files: Mutex<BTreeMap<String, (String, Vec<u8>)>>,
    next_sha: AtomicU64,
    /// Every PUT body received, in order.
    pub puts: Mutex<Vec<Value>>,
    /// Number of upcoming PUTs to reject with 409 regardless of SHA.
    pub inject_conflicts: AtomicU32,
    /// Number of upcoming GETs to answer with 502.
    pub inject_get_errors: AtomicU32,
}

impl MockRepo {
    pub fn file(&self, path: &str) -> Option<(String, Vec<u8>)> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn seed(&self, path: &str, content: &[u8]) -> String {
        let sha = self.mint_sha();
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), (sha.clone(), content.to_vec()));
        sha
    }

    pub fn put_bodies(&self) -> Vec<Value> {
        self.puts.lock().unwrap().clone()
    }

    fn mint_sha(&self) -> String {
        format!("sha{}", self.next_sha.fetch_add(1, Ordering::SeqCst))
    }
}

/// Start the mock API; returns its base URL for `github.api_base`.
pub async fn start_mock_github() -> (String, Arc<MockRepo>) {
    let repo = Arc::new(MockRepo::default());
    let app = Router::new()
        .route(
            "/repos/{owner}/{repo}/contents/{*path}",
            get(get_contents).put(put_contents),
        )
        .with_state(repo.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{}", addr), repo)
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response()
}

async fn get_contents(
    State(repo): State<Arc<MockRepo>>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
) -> Response {
    let path = path.trim_matches('/').to_string();
    if repo.inject_get_errors.load(Ordering::SeqCst) > 0 {
        repo.inject_get_errors.fetch_sub(1, Ordering::SeqCst);
        return (StatusCode::BAD_GATEWAY, Json(json!({ "message": "injected outage" }))).into_response();
    }
    let files = repo.files.lock().unwrap();

    if let Some((sha, content)) = files.get(&path) {
        // GitHub wraps base64 content at 60 columns
        let encoded = STANDARD.encode(content);
        let wrapped = encoded
            .as_bytes()
            .chunks(60)
            .map(|c| std::str::from_utf8(c).unwrap())
            .collect::<Vec<_>>()
            .join("\n");
        let name = path.rsplit('/').next().unwrap_or_default();
        return Json(json!({
            "name": name,
            "path": path,
            "sha": sha,
            "type": "file",
            "encoding": "base64",
            "content": wrapped,
        }))
        .into_response();
    }

    let dir_prefix = format!("{}/", path);
    let mut entries: BTreeMap<String, Value> = BTreeMap::new();
    for (key, (sha, _)) in files.iter() {
        let Some(rest) = key.strip_prefix(&dir_prefix) else {
            continue;
        };
        match rest.split_once('/') {
            Some((dir, _)) => {
                entries.entry(dir.to_string()).or_insert_with(|| {
                    json!({ "name": dir, "path": format!("{}{}", dir_prefix, dir), "sha": "tree", "type": "dir" })
                });
            }
            None => {
                entries.insert(
                    rest.to_string(),
                    json!({ "name": rest, "path": key, "sha": sha, "type": "file" }),
                );
            }
        }
    }

    if entries.is_empty() {
        return not_found();
    }
    Json(Value::Array(entries.into_values().collect())).into_response()
}

async fn put_contents(
    State(repo): State<Arc<MockRepo>>,
    Path((_owner, _repo, path)): Path<(String, String, String)>,
    Json(body): Json<Value>,
) -> Response {
    let path = path.trim_matches('/').to_string();
    repo.puts.lock().unwrap().push(body.clone());

    if repo.inject_conflicts.load(Ordering::SeqCst) > 0 {
        repo.inject_conflicts.fetch_sub(1, Ordering::SeqCst);
        return (StatusCode::CONFLICT, Json(json!({ "message": "injected conflict" }))).into_response();
    }

    let sent_sha = body.get("sha").and_then(Value::as_str).map(str::to_string);
    let content = match body
        .get("content")
        .and_then(Value::as_str)
        .map(|c| STANDARD.decode(c))
    {
        Some(Ok(bytes)) => bytes,
        _ => return (StatusCode::UNPROCESSABLE_ENTITY, "bad content").into_response(),
    };

    let mut files = repo.files.lock().unwrap();
    let current = files.get(&path).map(|(sha, _)| sha.clone());
    match (&current, &sent_sha) {
        (Some(cur), Some(sent)) if cur == sent => {}
        (None, None) => {}
        (Some(_), _) => {
            return (StatusCode::CONFLICT, Json(json!({ "message": "sha mismatch" }))).into_response();
        }
        (None, Some(_)) => {
            return (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "message": "sha for new file" })))
                .into_response();
        }
    }

    let sha = repo.mint_sha();
    files.insert(path.clone(), (sha.clone(), content));
    let status = if current.is_some() {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    (status, Json(json!({ "content": { "path": path, "sha": sha } }))).into_response()
}
