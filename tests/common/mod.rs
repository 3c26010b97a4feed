//! Shared harness for the integration suites: in-memory fakes for the data
//! gateway, blob backends, and the auth service, plus request helpers that
//! drive the router without a listening socket.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use cts_api::auth::account::{AccountError, AccountService};
use cts_api::auth::SessionClaims;
use cts_api::config::AppConfig;
use cts_api::gateway::{CredentialTier, DataAccessGateway, GatewayError, Order, SelectQuery};
use cts_api::state::AppState;
use cts_api::upload::{BlobBackend, UploadError, UploadObject, UploadService};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::development();
    config.backend.jwt_secret = TEST_SECRET.to_string();
    config.backend.anon_key = "anon-key".to_string();
    config.backend.service_key = Some("service-key".to_string());
    config
}

/// In-memory gateway: rows live in a per-table map, list queries are
/// evaluated against them, and every call is recorded so tests can assert
/// which tier touched which table and how often.
pub struct FakeGateway {
    tier: CredentialTier,
    tables: Mutex<HashMap<String, Vec<Value>>>,
    selects: Mutex<Vec<(String, SelectQuery)>>,
    writes: Mutex<Vec<(String, &'static str)>>,
    /// Columns the simulated backend schema lacks, per table. A select whose
    /// projection names one fails the way the real backend does.
    missing_columns: Mutex<HashMap<String, Vec<String>>>,
    failing_tables: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn new(tier: CredentialTier) -> Arc<Self> {
        Arc::new(Self {
            tier,
            tables: Mutex::new(HashMap::new()),
            selects: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            missing_columns: Mutex::new(HashMap::new()),
            failing_tables: Mutex::new(Vec::new()),
        })
    }

    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .extend(rows);
    }

    pub fn drop_column(&self, table: &str, column: &str) {
        self.missing_columns
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(column.to_string());
        // Drop the column from seeded rows too so projected results match.
        if let Some(rows) = self.tables.lock().unwrap().get_mut(table) {
            for row in rows {
                if let Some(obj) = row.as_object_mut() {
                    obj.remove(column);
                }
            }
        }
    }

    pub fn fail_table(&self, table: &str) {
        self.failing_tables.lock().unwrap().push(table.to_string());
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub fn select_count(&self, table: &str) -> usize {
        self.selects
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .count()
    }

    pub fn write_count(&self, table: &str) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == table)
            .count()
    }

    pub fn last_select(&self, table: &str) -> Option<SelectQuery> {
        self.selects
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(t, _)| t == table)
            .map(|(_, q)| q.clone())
    }

    fn check_scripted_failures(&self, table: &str, query: &SelectQuery) -> Result<(), GatewayError> {
        if self.failing_tables.lock().unwrap().iter().any(|t| t == table) {
            return Err(GatewayError::Transport(
                "simulated backend outage".to_string(),
            ));
        }
        if let Some(missing) = self.missing_columns.lock().unwrap().get(table) {
            if let Some(column) = query.columns.iter().find(|c| missing.contains(c)) {
                return Err(GatewayError::MissingColumn {
                    column: column.clone(),
                });
            }
        }
        Ok(())
    }
}

fn value_as_filter_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn row_matches(row: &Value, query: &SelectQuery) -> bool {
    for (column, wanted) in &query.eq {
        let actual = match row.get(column) {
            Some(v) => value_as_filter_string(v),
            None => return false,
        };
        if &actual != wanted {
            return false;
        }
    }
    if let Some((columns, needle)) = &query.search {
        let needle = needle.to_lowercase();
        let hit = columns.iter().any(|c| {
            row.get(c)
                .and_then(|v| v.as_str())
                .map(|s| s.to_lowercase().contains(&needle))
                .unwrap_or(false)
        });
        if !hit {
            return false;
        }
    }
    true
}

fn project(row: &Value, columns: &[String]) -> Value {
    if columns.is_empty() {
        return row.clone();
    }
    let Some(obj) = row.as_object() else {
        return row.clone();
    };
    Value::Object(
        obj.iter()
            .filter(|(k, _)| columns.iter().any(|c| c == *k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    )
}

#[async_trait]
impl DataAccessGateway for FakeGateway {
    fn tier(&self) -> CredentialTier {
        self.tier
    }

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, GatewayError> {
        self.selects
            .lock()
            .unwrap()
            .push((table.to_string(), query.clone()));
        self.check_scripted_failures(table, query)?;

        let tables = self.tables.lock().unwrap();
        let mut rows: Vec<Value> = tables
            .get(table)
            .map(|rows| rows.iter().filter(|r| row_matches(r, query)).cloned())
            .into_iter()
            .flatten()
            .collect();

        if let Some((column, order)) = &query.order {
            rows.sort_by(|a, b| {
                let ka = a.get(column).map(value_as_filter_string).unwrap_or_default();
                let kb = b.get(column).map(value_as_filter_string).unwrap_or_default();
                match order {
                    Order::Asc => ka.cmp(&kb),
                    Order::Desc => kb.cmp(&ka),
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit as usize);
        }

        Ok(rows.iter().map(|r| project(r, &query.columns)).collect())
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
        self.writes.lock().unwrap().push((table.to_string(), "insert"));
        let mut row = row;
        if row.get("id").is_none() {
            if let Some(obj) = row.as_object_mut() {
                obj.insert("id".to_string(), json!(Uuid::new_v4().to_string()));
            }
        }
        self.tables
            .lock()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        table: &str,
        id: &str,
        patch: Value,
    ) -> Result<Option<Value>, GatewayError> {
        self.writes.lock().unwrap().push((table.to_string(), "update"));
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(None);
        };
        for row in rows {
            let matches = row
                .get("id")
                .map(|v| value_as_filter_string(v) == id)
                .unwrap_or(false);
            if matches {
                if let (Some(target), Some(fields)) = (row.as_object_mut(), patch.as_object()) {
                    for (k, v) in fields {
                        target.insert(k.clone(), v.clone());
                    }
                }
                return Ok(Some(row.clone()));
            }
        }
        Ok(None)
    }

    async fn delete(&self, table: &str, id: &str) -> Result<u64, GatewayError> {
        self.writes.lock().unwrap().push((table.to_string(), "delete"));
        let mut tables = self.tables.lock().unwrap();
        let Some(rows) = tables.get_mut(table) else {
            return Ok(0);
        };
        let before = rows.len();
        rows.retain(|row| {
            row.get("id")
                .map(|v| value_as_filter_string(v) != id)
                .unwrap_or(true)
        });
        Ok((before - rows.len()) as u64)
    }

    async fn upsert_on(
        &self,
        table: &str,
        conflict_column: &str,
        row: Value,
    ) -> Result<Value, GatewayError> {
        self.writes.lock().unwrap().push((table.to_string(), "upsert"));
        let key = row
            .get(conflict_column)
            .map(value_as_filter_string)
            .unwrap_or_default();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        for existing in rows.iter_mut() {
            let matches = existing
                .get(conflict_column)
                .map(|v| value_as_filter_string(v) == key)
                .unwrap_or(false);
            if matches {
                *existing = row.clone();
                return Ok(row);
            }
        }
        rows.push(row.clone());
        Ok(row)
    }
}

/// Blob backend fake with a call counter, for asserting the fallback chain.
pub struct FakeBlob {
    pub name: &'static str,
    pub fail: bool,
    pub calls: AtomicUsize,
}

impl FakeBlob {
    pub fn new(name: &'static str, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            name,
            fail,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobBackend for FakeBlob {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn put(&self, object: &UploadObject) -> Result<String, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(UploadError::Backend {
                backend: self.name,
                message: "simulated outage".to_string(),
            })
        } else {
            Ok(format!("https://{}/{}", self.name, object.path))
        }
    }
}

/// Auth-service fake holding one known credential pair.
pub struct FakeAccounts {
    pub email: String,
    pub password: Mutex<String>,
    pub emails_set: Mutex<Vec<String>>,
    pub duplicate_email: Option<String>,
}

impl FakeAccounts {
    pub fn new(email: &str, password: &str) -> Arc<Self> {
        Arc::new(Self {
            email: email.to_string(),
            password: Mutex::new(password.to_string()),
            emails_set: Mutex::new(Vec::new()),
            duplicate_email: None,
        })
    }

    pub fn with_duplicate(email: &str, password: &str, taken: &str) -> Arc<Self> {
        Arc::new(Self {
            email: email.to_string(),
            password: Mutex::new(password.to_string()),
            emails_set: Mutex::new(Vec::new()),
            duplicate_email: Some(taken.to_string()),
        })
    }

    pub fn current_password(&self) -> String {
        self.password.lock().unwrap().clone()
    }
}

#[async_trait]
impl AccountService for FakeAccounts {
    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, AccountError> {
        Ok(email == self.email && password == *self.password.lock().unwrap())
    }

    async fn set_password(&self, _user_id: Uuid, new_password: &str) -> Result<(), AccountError> {
        *self.password.lock().unwrap() = new_password.to_string();
        Ok(())
    }

    async fn set_email(&self, _user_id: Uuid, new_email: &str) -> Result<(), AccountError> {
        if self.duplicate_email.as_deref() == Some(new_email) {
            return Err(AccountError::DuplicateEmail);
        }
        self.emails_set.lock().unwrap().push(new_email.to_string());
        Ok(())
    }
}

/// Everything a suite needs to drive the app and inspect the fakes.
pub struct Harness {
    pub config: AppConfig,
    pub scoped: Arc<FakeGateway>,
    pub elevated: Arc<FakeGateway>,
    pub primary_blob: Arc<FakeBlob>,
    pub fallback_blob: Arc<FakeBlob>,
    pub accounts: Arc<FakeAccounts>,
    pub admin_id: Uuid,
    pub admin_email: String,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        let scoped = FakeGateway::new(CredentialTier::Scoped);
        let elevated = FakeGateway::new(CredentialTier::Elevated);
        let admin_id = Uuid::new_v4();
        let admin_email = "admin@example.org".to_string();
        elevated.seed(
            "user_profiles",
            vec![json!({ "user_id": admin_id.to_string(), "role": "admin" })],
        );

        Self {
            config,
            scoped,
            elevated,
            primary_blob: FakeBlob::new("primary", false),
            fallback_blob: FakeBlob::new("fallback", false),
            accounts: FakeAccounts::new("admin@example.org", "correct horse"),
            admin_id,
            admin_email,
        }
    }

    pub fn app(&self) -> Router {
        self.app_with_elevated(Some(self.elevated.clone()))
    }

    /// Build the app with the elevated tier absent, simulating a deployment
    /// without the service credential.
    pub fn app_without_elevated(&self) -> Router {
        self.app_with_elevated(None)
    }

    fn app_with_elevated(&self, elevated: Option<Arc<FakeGateway>>) -> Router {
        let uploads = Arc::new(UploadService::new(
            Some(self.primary_blob.clone() as Arc<dyn BlobBackend>),
            self.fallback_blob.clone() as Arc<dyn BlobBackend>,
            self.config.uploads.max_bytes,
        ));
        let state = AppState {
            config: Arc::new(self.config.clone()),
            scoped: self.scoped.clone(),
            elevated: elevated.map(|g| g as Arc<dyn DataAccessGateway>),
            uploads,
            accounts: self.accounts.clone(),
        };
        cts_api::app(state)
    }

    pub fn admin_cookie(&self) -> String {
        let token = mint_token(self.admin_id, Some(&self.admin_email), 3600);
        format!("{}={}", self.config.session.cookie_name, token)
    }

    /// A session for a user without a profile row (so the role lookup finds
    /// nothing).
    pub fn stranger_cookie(&self) -> String {
        let token = mint_token(Uuid::new_v4(), Some("stranger@example.org"), 3600);
        format!("{}={}", self.config.session.cookie_name, token)
    }
}

pub fn mint_token(sub: Uuid, email: Option<&str>, exp_offset: i64) -> String {
    let claims = SessionClaims {
        sub,
        email: email.map(str::to_string),
        exp: Utc::now().timestamp() + exp_offset,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, cookie: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn upload_request(uri: &str, cookie: &str, filename: &str, bytes: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "image/jpeg")
        .header("x-filename", filename)
        .body(Body::from(bytes))
        .unwrap()
}
