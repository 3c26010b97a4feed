use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub backend: BackendConfig,
    pub uploads: UploadConfig,
    pub session: SessionConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Connection settings for the hosted backend (REST data API + auth service).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Anonymous key: session-scoped, subject to row-level security.
    pub anon_key: String,
    /// Service key: trusted server-only credential that bypasses row-level
    /// security. Optional at startup; elevated call sites report its absence
    /// with an actionable message instead of failing silently.
    pub service_key: Option<String>,
    /// Secret used to verify backend-minted session JWTs.
    pub jwt_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Hard ceiling on upload payload size, checked before any network call.
    pub max_bytes: usize,
    /// Token for the primary CDN blob store. When unset, uploads go straight
    /// to the fallback bucket.
    pub blob_token: Option<String>,
    /// Object-storage bucket used as the fallback backend and for resolving
    /// bare storage paths into public URLs.
    pub bucket: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Name of the cookie carrying the backend session access token.
    pub cookie_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    /// When true, the `x-debug-errors: 1` request header may attach truncated
    /// diagnostics to error responses. Never enabled in production defaults.
    pub allow_debug_errors: bool,
}

pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 5 * 1024 * 1024; // 5 MiB

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("BACKEND_URL") {
            self.backend.url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("BACKEND_ANON_KEY") {
            self.backend.anon_key = v;
        }
        if let Ok(v) = env::var("BACKEND_SERVICE_KEY") {
            if !v.trim().is_empty() {
                self.backend.service_key = Some(v);
            }
        }
        if let Ok(v) = env::var("BACKEND_JWT_SECRET") {
            self.backend.jwt_secret = v;
        }

        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }
        if let Ok(v) = env::var("BLOB_STORE_TOKEN") {
            if !v.trim().is_empty() {
                self.uploads.blob_token = Some(v);
            }
        }
        if let Ok(v) = env::var("STORAGE_BUCKET") {
            self.uploads.bucket = v;
        }

        if let Ok(v) = env::var("SESSION_COOKIE") {
            self.session.cookie_name = v;
        }

        if let Ok(v) = env::var("CTS_API_PORT").or_else(|_| env::var("PORT")) {
            self.api.port = v.parse().unwrap_or(self.api.port);
        }
        if let Ok(v) = env::var("API_ALLOW_DEBUG_ERRORS") {
            self.api.allow_debug_errors = v.parse().unwrap_or(self.api.allow_debug_errors);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            backend: BackendConfig {
                url: "http://localhost:54321".to_string(),
                anon_key: String::new(),
                service_key: None,
                jwt_secret: String::new(),
            },
            uploads: UploadConfig {
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
                blob_token: None,
                bucket: "media".to_string(),
            },
            session: SessionConfig {
                cookie_name: "sb-access-token".to_string(),
            },
            api: ApiConfig {
                port: 3000,
                allow_debug_errors: true,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            backend: BackendConfig {
                url: String::new(),
                anon_key: String::new(),
                service_key: None,
                jwt_secret: String::new(),
            },
            uploads: UploadConfig {
                max_bytes: DEFAULT_UPLOAD_MAX_BYTES,
                blob_token: None,
                bucket: "media".to_string(),
            },
            session: SessionConfig {
                cookie_name: "sb-access-token".to_string(),
            },
            api: ApiConfig {
                port: 3000,
                allow_debug_errors: false,
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
