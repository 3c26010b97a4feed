//! Upload service: size ceiling, filename hygiene, and a two-backend
//! fallback chain.
//!
//! Order of operations is part of the contract: the size check happens
//! before any network call; the primary CDN blob store is tried only when
//! its token is configured; on any primary failure the storage bucket is
//! attempted exactly once with the elevated credential.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

use crate::config::AppConfig;

/// Logical folder prepended to every stored object.
pub const UPLOAD_FOLDER: &str = "uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload of {size} bytes exceeds the limit of {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("{backend} upload failed: {message}")]
    Backend {
        backend: &'static str,
        message: String,
    },

    #[error("all upload backends failed")]
    AllBackendsFailed {
        primary: Option<String>,
        fallback: String,
    },
}

#[derive(Debug, Clone)]
pub struct UploadObject {
    pub path: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[async_trait]
pub trait BlobBackend: Send + Sync {
    fn name(&self) -> &'static str;

    /// Store the object and return its publicly resolvable URL.
    async fn put(&self, object: &UploadObject) -> Result<String, UploadError>;
}

pub struct UploadService {
    primary: Option<Arc<dyn BlobBackend>>,
    fallback: Arc<dyn BlobBackend>,
    max_bytes: usize,
}

impl UploadService {
    pub fn new(
        primary: Option<Arc<dyn BlobBackend>>,
        fallback: Arc<dyn BlobBackend>,
        max_bytes: usize,
    ) -> Self {
        Self {
            primary,
            fallback,
            max_bytes,
        }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub async fn store(
        &self,
        filename: &str,
        content_type: &str,
        bytes: Bytes,
    ) -> Result<String, UploadError> {
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let object = UploadObject {
            path: object_path(filename),
            content_type: content_type.to_string(),
            bytes,
        };

        let primary_failure = match &self.primary {
            Some(primary) => match primary.put(&object).await {
                Ok(url) => return Ok(url),
                Err(err) => {
                    tracing::warn!(
                        backend = primary.name(),
                        "primary upload backend failed, falling back: {}",
                        err
                    );
                    Some(err.to_string())
                }
            },
            None => None,
        };

        match self.fallback.put(&object).await {
            Ok(url) => Ok(url),
            Err(err) => Err(UploadError::AllBackendsFailed {
                primary: primary_failure,
                fallback: err.to_string(),
            }),
        }
    }
}

/// Timestamp-prefixed object path under the upload folder. The prefix keeps
/// repeated uploads of the same filename from colliding.
fn object_path(filename: &str) -> String {
    format!(
        "{}/{}-{}",
        UPLOAD_FOLDER,
        Utc::now().timestamp_millis(),
        sanitize_filename(filename)
    )
}

/// Strip everything outside `[a-zA-Z0-9.\-_]`; path separators and exotic
/// characters never reach a storage key.
pub fn sanitize_filename(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Primary backend: a CDN blob store addressed with a bearer token.
pub struct CdnBlobBackend {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl CdnBlobBackend {
    pub const DEFAULT_BASE_URL: &'static str = "https://blob.vercel-storage.com";

    pub fn new(token: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            token: token.to_string(),
        }
    }

    pub fn boxed(token: &str) -> Arc<dyn BlobBackend> {
        Arc::new(Self::new(token))
    }
}

#[async_trait]
impl BlobBackend for CdnBlobBackend {
    fn name(&self) -> &'static str {
        "cdn-blob"
    }

    async fn put(&self, object: &UploadObject) -> Result<String, UploadError> {
        let url = format!("{}/{}", self.base_url, object.path);
        let response = self
            .http
            .put(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Content-Type", &object.content_type)
            .header("x-api-version", "7")
            .body(object.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::Backend {
                backend: self.name(),
                message: e.to_string(),
            })?;

        let status = response.status();
        let body: serde_json::Value =
            response.json().await.map_err(|e| UploadError::Backend {
                backend: self.name(),
                message: e.to_string(),
            })?;

        if !status.is_success() {
            return Err(UploadError::Backend {
                backend: self.name(),
                message: format!("{}: {}", status, body),
            });
        }

        body.get("url")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or_else(|| UploadError::Backend {
                backend: self.name(),
                message: "response carried no url".to_string(),
            })
    }
}

/// Fallback backend: the hosted backend's object-storage bucket, written
/// with the elevated credential so row policies cannot block server uploads.
pub struct StorageBucketBackend {
    http: reqwest::Client,
    base_url: String,
    service_key: Option<String>,
    bucket: String,
}

impl StorageBucketBackend {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.backend.url.trim_end_matches('/').to_string(),
            service_key: config.backend.service_key.clone(),
            bucket: config.uploads.bucket.clone(),
        }
    }

    pub fn boxed(config: &AppConfig) -> Arc<dyn BlobBackend> {
        Arc::new(Self::from_config(config))
    }
}

#[async_trait]
impl BlobBackend for StorageBucketBackend {
    fn name(&self) -> &'static str {
        "storage-bucket"
    }

    async fn put(&self, object: &UploadObject) -> Result<String, UploadError> {
        let key = self.service_key.as_deref().ok_or_else(|| UploadError::Backend {
            backend: self.name(),
            message: "BACKEND_SERVICE_KEY is not configured; the storage bucket \
                      requires the elevated service credential"
                .to_string(),
        })?;

        let url = format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url, self.bucket, object.path
        );
        let response = self
            .http
            .post(&url)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {}", key))
            .header("Content-Type", &object.content_type)
            .body(object.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::Backend {
                backend: self.name(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UploadError::Backend {
                backend: self.name(),
                message: format!("{}: {}", status, text),
            });
        }

        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, self.bucket, object.path
        ))
    }
}
