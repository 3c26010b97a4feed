use std::sync::Arc;

use crate::auth::account::{AccountService, HostedAccountService};
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::gateway::{DataAccessGateway, ElevatedGateway, ScopedGateway};
use crate::upload::{CdnBlobBackend, StorageBucketBackend, UploadService};

/// Shared per-request dependencies. Everything behind a trait object so
/// tests can swap in fakes and assert which credential tier a call used.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub scoped: Arc<dyn DataAccessGateway>,
    /// `None` when the service key is not configured; call sites go through
    /// [`AppState::elevated`] to get the actionable error.
    pub elevated: Option<Arc<dyn DataAccessGateway>>,
    pub uploads: Arc<UploadService>,
    pub accounts: Arc<dyn AccountService>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Self {
        let scoped: Arc<dyn DataAccessGateway> = Arc::new(ScopedGateway::from_config(&config));
        let elevated: Option<Arc<dyn DataAccessGateway>> =
            match ElevatedGateway::from_config(&config) {
                Ok(gateway) => Some(Arc::new(gateway) as Arc<dyn DataAccessGateway>),
                Err(err) => {
                    tracing::warn!("elevated gateway unavailable: {}", err);
                    None
                }
            };

        let primary = config
            .uploads
            .blob_token
            .as_deref()
            .map(|token| CdnBlobBackend::boxed(token));
        let fallback = StorageBucketBackend::boxed(&config);
        let uploads = Arc::new(UploadService::new(
            primary,
            fallback,
            config.uploads.max_bytes,
        ));

        let accounts: Arc<dyn AccountService> = Arc::new(HostedAccountService::from_config(&config));

        Self {
            config: Arc::new(config),
            scoped,
            elevated,
            uploads,
            accounts,
        }
    }

    /// The elevated gateway, or an explicit actionable error when the
    /// service credential was never configured.
    pub fn elevated(&self) -> Result<&Arc<dyn DataAccessGateway>, ApiError> {
        self.elevated.as_ref().ok_or_else(|| {
            ApiError::internal_server_error(
                "BACKEND_SERVICE_KEY is not configured; admin operations require \
                 the elevated service credential",
            )
        })
    }
}
