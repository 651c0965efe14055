#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use base64::Engine as _;
use pandora_helper::HelperError;
use pandora_helper::config::Config;
use pandora_helper::db::{Account, Repository, Share, SqliteRepository};
use pandora_helper::service::Services;
use serde_json::{Value, json};
use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use url::Url;

pub fn unique_sqlite_path(prefix: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "pandora-helper-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

/// Unsigned JWT carrying only `exp`.
pub fn make_jwt(exp: i64) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = engine.encode(json!({ "exp": exp }).to_string());
    format!("{header}.{payload}.sig")
}

pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn form(&self) -> HashMap<String, String> {
        url::form_urlencoded::parse(&self.body).into_owned().collect()
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("captured body is json")
    }
}

/// Stand-in for the token, chat and index services plus a OneApi gateway.
#[derive(Clone)]
pub struct MockUpstream {
    pub reqs: Arc<Mutex<Vec<Captured>>>,
    /// Access token handed out by the refresh endpoint.
    pub refreshed_access_token: Arc<Mutex<String>>,
    /// Unique names the register endpoint rejects with a 500.
    pub failing_names: Arc<Mutex<HashSet<String>>>,
    pub channels: Arc<Mutex<HashMap<i64, Value>>>,
    registered: Arc<AtomicUsize>,
}

impl Default for MockUpstream {
    fn default() -> Self {
        Self {
            reqs: Arc::default(),
            refreshed_access_token: Arc::new(Mutex::new(make_jwt(now_ts() + 86_400 * 30))),
            failing_names: Arc::default(),
            channels: Arc::default(),
            registered: Arc::default(),
        }
    }
}

impl MockUpstream {
    fn capture(&self, path: String, headers: HeaderMap, body: &[u8]) {
        self.reqs.lock().unwrap().push(Captured {
            path,
            headers,
            body: body.to_vec(),
        });
    }

    pub fn requests_to(&self, path: &str) -> Vec<Captured> {
        self.reqs
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }

    pub fn request_count(&self) -> usize {
        self.reqs.lock().unwrap().len()
    }

    pub async fn spawn(&self) -> Url {
        let app = Router::new()
            .route("/api/auth/refresh", post(refresh_handler))
            .route("/token/register", post(register_handler))
            .route("/token/info/{token}", get(info_handler))
            .route("/api/auth/oauth_token", post(oauth_token_handler))
            .route("/api/channel/{id}", get(get_channel_handler))
            .route("/api/channel", axum::routing::put(put_channel_handler))
            .with_state(self.clone());
        spawn_test_server(app).await
    }
}

async fn refresh_handler(
    State(state): State<MockUpstream>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    state.capture("/api/auth/refresh".to_string(), headers, &body);
    let form: HashMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();
    if form.get("refresh_token").is_none_or(String::is_empty) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "missing refresh_token" })),
        );
    }
    let token = state.refreshed_access_token.lock().unwrap().clone();
    (StatusCode::OK, Json(json!({ "access_token": token })))
}

async fn register_handler(
    State(state): State<MockUpstream>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> (StatusCode, Json<Value>) {
    state.capture("/token/register".to_string(), headers, &body);
    let form: HashMap<String, String> = url::form_urlencoded::parse(&body).into_owned().collect();
    let name = form.get("unique_name").cloned().unwrap_or_default();
    if state.failing_names.lock().unwrap().contains(&name) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": "register failed" })),
        );
    }
    let n = state.registered.fetch_add(1, Ordering::SeqCst) + 1;
    (
        StatusCode::OK,
        Json(json!({ "token_key": format!("fk-{name}-{n}") })),
    )
}

async fn info_handler(
    State(state): State<MockUpstream>,
    Path(token): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    state.capture(format!("/token/info/{token}"), headers, &[]);
    Json(json!({ "gpt35_limit": "7", "gpt4_limit": 2 }))
}

async fn oauth_token_handler(
    State(state): State<MockUpstream>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Json<Value> {
    state.capture("/api/auth/oauth_token".to_string(), headers, &body);
    Json(json!({
        "login_url": "/auth/login_oauth?token=oauth-1",
        "oauth_token": "oauth-1"
    }))
}

async fn get_channel_handler(
    State(state): State<MockUpstream>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    state.capture(format!("/api/channel/{id}"), headers, &[]);
    match state.channels.lock().unwrap().get(&id) {
        Some(channel) => (
            StatusCode::OK,
            Json(json!({ "success": true, "data": channel })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "no such channel" })),
        ),
    }
}

async fn put_channel_handler(
    State(state): State<MockUpstream>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Json<Value> {
    state.capture("/api/channel".to_string(), headers, &body);
    Json(json!({ "success": true, "message": "" }))
}

/// Delegates to SQLite while counting the writes the services issue.
pub struct CountingRepository {
    inner: SqliteRepository,
    pub account_updates: AtomicUsize,
    pub share_updates: AtomicUsize,
}

impl CountingRepository {
    pub fn new(inner: SqliteRepository) -> Self {
        Self {
            inner,
            account_updates: AtomicUsize::new(0),
            share_updates: AtomicUsize::new(0),
        }
    }

    pub fn account_updates(&self) -> usize {
        self.account_updates.load(Ordering::SeqCst)
    }

    pub fn share_updates(&self) -> usize {
        self.share_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Repository for CountingRepository {
    async fn get_account(&self, id: i64) -> Result<Account, HelperError> {
        self.inner.get_account(id).await
    }

    async fn create_account(&self, account: &Account) -> Result<i64, HelperError> {
        self.inner.create_account(account).await
    }

    async fn update_account(&self, account: &Account) -> Result<(), HelperError> {
        self.account_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_account(account).await
    }

    async fn delete_account(&self, id: i64) -> Result<(), HelperError> {
        self.inner.delete_account(id).await
    }

    async fn search_accounts(
        &self,
        account_type: &str,
        keyword: &str,
    ) -> Result<Vec<Account>, HelperError> {
        self.inner.search_accounts(account_type, keyword).await
    }

    async fn list_shared_accounts(&self) -> Result<Vec<Account>, HelperError> {
        self.inner.list_shared_accounts().await
    }

    async fn get_share(&self, id: i64) -> Result<Share, HelperError> {
        self.inner.get_share(id).await
    }

    async fn get_share_by_unique_name(&self, unique_name: &str) -> Result<Share, HelperError> {
        self.inner.get_share_by_unique_name(unique_name).await
    }

    async fn create_share(&self, share: &Share) -> Result<i64, HelperError> {
        self.inner.create_share(share).await
    }

    async fn update_share(&self, share: &Share) -> Result<(), HelperError> {
        self.share_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_share(share).await
    }

    async fn delete_share(&self, id: i64) -> Result<(), HelperError> {
        self.inner.delete_share(id).await
    }

    async fn search_shares(
        &self,
        email: &str,
        unique_name: &str,
    ) -> Result<Vec<Share>, HelperError> {
        self.inner.search_shares(email, unique_name).await
    }

    async fn get_shares_by_account_id(&self, account_id: i64) -> Result<Vec<Share>, HelperError> {
        self.inner.get_shares_by_account_id(account_id).await
    }
}

pub struct Harness {
    pub upstream: MockUpstream,
    pub repo: Arc<CountingRepository>,
    pub services: Services,
    pub cfg: Config,
}

/// Fresh database, mock upstreams, and services wired against both.
pub async fn harness(prefix: &str, with_oneapi: bool) -> Harness {
    let upstream = MockUpstream::default();
    let base = upstream.spawn().await;

    let temp_path = unique_sqlite_path(prefix);
    let database_url = format!("sqlite:{}", temp_path.display());
    let sqlite = SqliteRepository::connect(&database_url)
        .await
        .expect("open sqlite");
    let repo = Arc::new(CountingRepository::new(sqlite));

    let mut cfg = Config::default();
    cfg.basic.admin_password = "pwd".to_string();
    cfg.pandora.chat_domain = base.clone();
    cfg.pandora.token_domain = base.clone();
    cfg.pandora.index_domain = base.clone();
    cfg.pandora.claude_domain = base.clone();
    if with_oneapi {
        cfg.oneapi.token = "oneapi-admin".to_string();
        cfg.oneapi.domain = base.to_string();
    }

    let services = Services::new(repo.clone(), &cfg, reqwest::Client::new());
    Harness {
        upstream,
        repo,
        services,
        cfg,
    }
}

pub fn chatgpt_account(access_token: &str, refresh_token: &str) -> Account {
    Account {
        account_type: "chatgpt".to_string(),
        email: "owner@example.com".to_string(),
        access_token: access_token.to_string(),
        refresh_token: refresh_token.to_string(),
        ..Default::default()
    }
}
