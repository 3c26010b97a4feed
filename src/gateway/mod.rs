//! Data access gateway over the hosted backend's REST surface.
//!
//! Two credential tiers exist with the same call shape: `ScopedGateway`
//! carries the anonymous key and is subject to row-level security;
//! `ElevatedGateway` carries the service key and bypasses it. Handlers take
//! `Arc<dyn DataAccessGateway>` so tests can substitute fakes and assert
//! which tier an operation used.

pub mod client;
pub mod error;
pub mod projection;
pub mod query;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::config::AppConfig;

pub use client::RestClient;
pub use error::GatewayError;
pub use query::{Order, SelectQuery};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialTier {
    /// Anonymous/session key; the backend applies row-level security.
    Scoped,
    /// Trusted server-only service key; bypasses row-level security.
    Elevated,
}

#[async_trait]
pub trait DataAccessGateway: Send + Sync {
    fn tier(&self) -> CredentialTier;

    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<Value>, GatewayError>;

    async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError>;

    /// Patch the row with the given id; `None` when no row matched.
    async fn update(&self, table: &str, id: &str, patch: Value)
        -> Result<Option<Value>, GatewayError>;

    /// Hard delete; returns the number of rows removed.
    async fn delete(&self, table: &str, id: &str) -> Result<u64, GatewayError>;

    /// Insert-or-merge keyed on `conflict_column` (settings singleton rows).
    async fn upsert_on(
        &self,
        table: &str,
        conflict_column: &str,
        row: Value,
    ) -> Result<Value, GatewayError>;
}

pub struct ScopedGateway {
    rest: RestClient,
}

impl ScopedGateway {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            rest: RestClient::new(&config.backend.url, &config.backend.anon_key),
        }
    }
}

pub struct ElevatedGateway {
    rest: RestClient,
}

impl ElevatedGateway {
    /// Fails with an actionable message when the service key is absent; a
    /// silently-missing elevated credential would surface later as opaque
    /// RLS denials.
    pub fn from_config(config: &AppConfig) -> Result<Self, GatewayError> {
        let key = config.backend.service_key.as_deref().ok_or_else(|| {
            GatewayError::MissingCredential(
                "BACKEND_SERVICE_KEY is not configured; admin operations require \
                 the elevated service credential"
                    .to_string(),
            )
        })?;
        Ok(Self {
            rest: RestClient::new(&config.backend.url, key),
        })
    }
}

macro_rules! impl_gateway {
    ($type:ty, $tier:expr) => {
        #[async_trait]
        impl DataAccessGateway for $type {
            fn tier(&self) -> CredentialTier {
                $tier
            }

            async fn select(
                &self,
                table: &str,
                query: &SelectQuery,
            ) -> Result<Vec<Value>, GatewayError> {
                self.rest.select(table, &query.to_params()).await
            }

            async fn insert(&self, table: &str, row: Value) -> Result<Value, GatewayError> {
                self.rest.insert(table, &row).await
            }

            async fn update(
                &self,
                table: &str,
                id: &str,
                patch: Value,
            ) -> Result<Option<Value>, GatewayError> {
                self.rest.update(table, id, &patch).await
            }

            async fn delete(&self, table: &str, id: &str) -> Result<u64, GatewayError> {
                self.rest.delete(table, id).await
            }

            async fn upsert_on(
                &self,
                table: &str,
                conflict_column: &str,
                row: Value,
            ) -> Result<Value, GatewayError> {
                self.rest.upsert_on(table, conflict_column, &row).await
            }
        }
    };
}

impl_gateway!(ScopedGateway, CredentialTier::Scoped);
impl_gateway!(ElevatedGateway, CredentialTier::Elevated);

/// Run a list query, retrying with a reduced projection whenever the backend
/// reports a missing column. Iteration is bounded by the projection size;
/// exhaustion surfaces as schema drift rather than a generic failure.
pub async fn select_with_negotiation(
    gateway: &Arc<dyn DataAccessGateway>,
    table: &str,
    query: SelectQuery,
) -> Result<Vec<Value>, GatewayError> {
    let mut query = query;
    let bound = query.columns.len().max(1);

    for _ in 0..=bound {
        match gateway.select(table, &query).await {
            Ok(rows) => return Ok(rows),
            Err(GatewayError::MissingColumn { column }) => {
                tracing::warn!(
                    table = table,
                    column = column.as_str(),
                    "backend reported missing column; retrying with reduced projection"
                );
                match projection::reduce_projection(&query.columns, &column) {
                    Some(reduced) => query.columns = reduced,
                    None => {
                        return Err(GatewayError::SchemaDrift {
                            table: table.to_string(),
                        })
                    }
                }
            }
            Err(other) => return Err(other),
        }
    }

    Err(GatewayError::SchemaDrift {
        table: table.to_string(),
    })
}
