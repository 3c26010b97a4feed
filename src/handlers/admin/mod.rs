//! Admin CRUD endpoints. All routes here sit behind the admin gate and use
//! the elevated gateway: admin-created content must bypass row policies
//! that would otherwise require a session-owner match.

pub mod account;
pub mod events;
pub mod pages;
pub mod settings;
pub mod sites;
pub mod stories;
pub mod uploads;

use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::gateway::{select_with_negotiation, DataAccessGateway, SelectQuery};

/// Id format check, done before any backend round-trip.
pub(crate) fn parse_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::malformed_id())
}

pub(crate) async fn fetch_by_id(
    gateway: &Arc<dyn DataAccessGateway>,
    table: &str,
    columns: &[&str],
    id: Uuid,
) -> Result<Value, ApiError> {
    let query = SelectQuery::new()
        .columns(columns.iter().copied())
        .eq("id", id.to_string())
        .limit(1);
    let mut rows = select_with_negotiation(gateway, table, query).await?;
    if rows.is_empty() {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(rows.remove(0))
}
