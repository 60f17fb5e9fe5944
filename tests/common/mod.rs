#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use todo_api::config::AppConfig;
use todo_api::database::MemoryStore;
use todo_api::{app, AppState};

pub const PASSWORD: &str = "Secret123";

/// Router over a fresh in-memory store with uploads in a temp dir.
pub struct TestApp {
    pub router: Router,
    pub config: AppConfig,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `name=value` part of the first `Set-Cookie` header.
    pub fn cookie(&self) -> Option<String> {
        let raw = self.headers.get(header::SET_COOKIE)?.to_str().ok()?;
        raw.split(';').next().map(str::to_string)
    }

    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}

pub fn test_config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::for_tests();
    config.uploads.directory = uploads.path().to_string_lossy().into_owned();
    config
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        let uploads = tempfile::tempdir().context("failed to create upload dir")?;
        let mut config = test_config(&uploads);
        adjust(&mut config);

        let state = AppState::new(config.clone(), Arc::new(MemoryStore::new()))?;
        Ok(Self {
            router: app(state),
            config,
            uploads,
        })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Ok(TestResponse { status, headers, body })
    }

    /// Body bytes as served, for non-JSON routes.
    pub async fn get_raw(&self, path: &str) -> Result<(StatusCode, Vec<u8>)> {
        let request = Request::builder().uri(path).body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        Ok((status, bytes.to_vec()))
    }

    pub async fn call(&self, method: Method, path: &str, cookie: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))?,
            None => builder.body(Body::empty())?,
        };
        self.send(request).await
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.call(Method::GET, path, cookie, None).await
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>, body: Value) -> Result<TestResponse> {
        self.call(Method::POST, path, cookie, Some(body)).await
    }

    pub async fn put(&self, path: &str, cookie: Option<&str>, body: Value) -> Result<TestResponse> {
        self.call(Method::PUT, path, cookie, Some(body)).await
    }

    pub async fn patch(&self, path: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.call(Method::PATCH, path, cookie, None).await
    }

    pub async fn delete(&self, path: &str, cookie: Option<&str>) -> Result<TestResponse> {
        self.call(Method::DELETE, path, cookie, None).await
    }

    /// Registers a user and logs in; returns the user JSON and the session cookie.
    pub async fn signup(&self, name: &str, email: &str) -> Result<(Value, String)> {
        let registered = self
            .post("/api/v1/register", None, json!({ "name": name, "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(registered.status == StatusCode::CREATED, "register failed: {:?}", registered.body);

        let login = self
            .post("/api/v1/login", None, json!({ "email": email, "password": PASSWORD }))
            .await?;
        anyhow::ensure!(login.status == StatusCode::OK, "login failed: {:?}", login.body);

        let cookie = login.cookie().context("login did not set a cookie")?;
        Ok((registered.body, cookie))
    }

    pub async fn create_list(&self, cookie: &str, name: &str) -> Result<Value> {
        let res = self.post("/api/v1/lists", Some(cookie), json!({ "name": name })).await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create list failed: {:?}", res.body);
        Ok(res.body)
    }

    pub async fn create_task(&self, cookie: &str, list_id: i64, title: &str) -> Result<Value> {
        let res = self
            .post("/api/v1/tasks", Some(cookie), json!({ "listId": list_id, "title": title }))
            .await?;
        anyhow::ensure!(res.status == StatusCode::CREATED, "create task failed: {:?}", res.body);
        Ok(res.body)
    }
}

/// Multipart body with a single file part.
pub fn multipart_request(path: &str, cookie: Option<&str>, field: &str, file_name: &str, contents: &[u8]) -> Result<Request<Body>> {
    let boundary = "todo-api-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(path)
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", boundary));
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::from(body))?)
}

/// A real server bound to a free port, for tests that need a socket.
pub struct TestServer {
    pub base_url: String,
    _uploads: TempDir,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let uploads = tempfile::tempdir()?;
        let state = AppState::new(test_config(&uploads), Arc::new(MemoryStore::new()))?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app(state)).await;
        });

        let server = Self {
            base_url,
            _uploads: uploads,
        };
        server.wait_ready(Duration::from_secs(10)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = client.get(format!("{}/health", self.base_url)).send().await {
                if resp.status() == reqwest::StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}
