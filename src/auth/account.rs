//! Account-credential operations proxied to the hosted auth service.
//!
//! Password verification uses the anonymous password grant; password and
//! email changes go through the service-credential admin endpoint so the
//! flow matches the two-tier model used everywhere else.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("email already in use")]
    DuplicateEmail,

    #[error("{0}")]
    Unconfigured(String),

    #[error("auth service error: {0}")]
    Backend(String),
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Check a password against the auth service. `Ok(false)` means the
    /// credentials were wrong; errors are service failures.
    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, AccountError>;

    async fn set_password(&self, user_id: Uuid, new_password: &str) -> Result<(), AccountError>;

    async fn set_email(&self, user_id: Uuid, new_email: &str) -> Result<(), AccountError>;
}

pub struct HostedAccountService {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    service_key: Option<String>,
}

impl HostedAccountService {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend.url.trim_end_matches('/').to_string(),
            anon_key: config.backend.anon_key.clone(),
            service_key: config.backend.service_key.clone(),
        }
    }

    fn service_key(&self) -> Result<&str, AccountError> {
        self.service_key.as_deref().ok_or_else(|| {
            AccountError::Unconfigured(
                "BACKEND_SERVICE_KEY is not configured; account updates require \
                 the elevated service credential"
                    .to_string(),
            )
        })
    }

    async fn admin_update(
        &self,
        user_id: Uuid,
        body: serde_json::Value,
    ) -> Result<(), AccountError> {
        let key = self.service_key()?;
        let url = format!("{}/auth/v1/admin/users/{}", self.base_url, user_id);
        let response = self
            .http
            .put(&url)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
            .json(&body)
            .send()
            .await
            .map_err(|e| AccountError::Backend(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let text = response.text().await.unwrap_or_default();
        if status.as_u16() == 422 || text.to_ascii_lowercase().contains("already") {
            return Err(AccountError::DuplicateEmail);
        }
        Err(AccountError::Backend(format!("{}: {}", status, text)))
    }
}

#[async_trait]
impl AccountService for HostedAccountService {
    async fn verify_password(&self, email: &str, password: &str) -> Result<bool, AccountError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .http
            .post(&url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AccountError::Backend(e.to_string()))?;

        match response.status().as_u16() {
            200 => Ok(true),
            400 | 401 | 403 => Ok(false),
            status => {
                let text = response.text().await.unwrap_or_default();
                Err(AccountError::Backend(format!("{}: {}", status, text)))
            }
        }
    }

    async fn set_password(&self, user_id: Uuid, new_password: &str) -> Result<(), AccountError> {
        self.admin_update(user_id, json!({ "password": new_password }))
            .await
    }

    async fn set_email(&self, user_id: Uuid, new_email: &str) -> Result<(), AccountError> {
        self.admin_update(
            user_id,
            json!({ "email": new_email, "email_confirm": true }),
        )
        .await
    }
}
