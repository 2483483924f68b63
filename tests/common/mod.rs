#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{body::Body, http::Request, Router};
use serde_json::{Map, Value};
use sqlx::{Executor, PgPool};
use tokio::sync::OnceCell;
use tower::ServiceExt;

use jobly_api::auth::{generate_jwt, Claims};
use jobly_api::config;
use jobly_api::database::DatabaseManager;
use jobly_api::{app, AppState};

static SERVER: OnceLock<TestServer> = OnceLock::new();
static SCHEMA: OnceCell<()> = OnceCell::const_new();
static UNIQUE: AtomicUsize = AtomicUsize::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly-api"));
        cmd.args(["--port", &port.to_string()])
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline { break; }
            // The root route needs no database
            if let Ok(resp) = client.get(&self.base_url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// In-process router over a pool that never connects unless a handler queries it
pub fn test_app() -> Router {
    let pool = DatabaseManager::connect_lazy(&config::config().database).expect("lazy pool");
    app(AppState::new(pool))
}

pub fn token(username: &str, is_admin: bool) -> String {
    signed(&Claims::new(username, is_admin))
}

pub fn signed(claims: &Claims) -> String {
    generate_jwt(claims, &config::config().security.jwt_secret).expect("sign token")
}

pub async fn send(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (u16, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("request");

    let response = test_app().oneshot(request).await.expect("response");
    let status = response.status().as_u16();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// One-connection pool on the configured database with the schema loaded,
/// or `None` when no database answers.
///
/// A single connection means every query in a test shares one prepared
/// statement cache.
pub async fn database() -> Option<PgPool> {
    let mut settings = config::config().database.clone();
    settings.max_connections = 1;
    settings.connection_timeout = 5;

    let pool = match DatabaseManager::connect(&settings).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("skipping database test: {}", e);
            return None;
        }
    };

    SCHEMA
        .get_or_try_init(|| async {
            pool.execute(include_str!("../../sql/schema.sql")).await.map(|_| ())
        })
        .await
        .expect("load schema");

    Some(pool)
}

/// Lowercase key unique to this test process
pub fn unique(prefix: &str) -> String {
    let n = UNIQUE.fetch_add(1, Ordering::Relaxed);
    format!("{}{}x{}", prefix, std::process::id(), n)
}

pub fn object(value: Value) -> Map<String, Value> {
    value.as_object().cloned().expect("json object")
}
