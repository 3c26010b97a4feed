use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::content::page::{self, PageCreate, PagePatch};
use crate::error::ApiError;
use crate::gateway::{select_with_negotiation, Order, SelectQuery};
use crate::handlers::ListQuery;
use crate::state::AppState;

use super::{fetch_by_id, parse_id};

/// GET /api/admin/pages
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let elevated = state.elevated()?.clone();
    let mut query = SelectQuery::new()
        .columns(page::COLUMNS.iter().copied())
        .order("created_at", Order::Desc);
    query = params.apply_search(query, page::SEARCH_COLUMNS);

    let rows = select_with_negotiation(&elevated, page::TABLE, query).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /api/admin/pages/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let elevated = state.elevated()?.clone();
    let row = fetch_by_id(&elevated, page::TABLE, page::COLUMNS, id).await?;
    Ok(Json(json!({ "data": row })))
}

/// POST /api/admin/pages
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PageCreate>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;
    let row = state
        .elevated()?
        .insert(page::TABLE, payload.into_row())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": row }))))
}

/// PATCH /api/admin/pages/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<PagePatch>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;
    let updated = state
        .elevated()?
        .update(page::TABLE, &id.to_string(), payload.into_row())
        .await?;
    match updated {
        Some(row) => Ok(Json(json!({ "data": row }))),
        None => Err(ApiError::not_found("Not found")),
    }
}

/// DELETE /api/admin/pages/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .elevated()?
        .delete(page::TABLE, &id.to_string())
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
