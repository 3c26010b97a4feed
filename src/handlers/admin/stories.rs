use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::content::story::{self, StoryCreate, StoryPatch};
use crate::error::ApiError;
use crate::gateway::{select_with_negotiation, Order, SelectQuery};
use crate::handlers::ListQuery;
use crate::state::AppState;

use super::{fetch_by_id, parse_id};

/// GET /api/admin/stories - all stories including drafts, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let elevated = state.elevated()?.clone();
    let mut query = SelectQuery::new()
        .columns(story::COLUMNS.iter().copied())
        .order("created_at", Order::Desc);
    query = ListQuery::apply_eq(query, "category", params.category.as_ref());
    query = params.apply_search(query, story::SEARCH_COLUMNS);

    let rows = select_with_negotiation(&elevated, story::TABLE, query).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /api/admin/stories/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let elevated = state.elevated()?.clone();
    let row = fetch_by_id(&elevated, story::TABLE, story::COLUMNS, id).await?;
    Ok(Json(json!({ "data": row })))
}

/// POST /api/admin/stories - created stories go live immediately
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<StoryCreate>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;
    let row = state
        .elevated()?
        .insert(story::TABLE, payload.into_row())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": row }))))
}

/// PATCH /api/admin/stories/:id - persists only the supplied fields
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<StoryPatch>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;
    let updated = state
        .elevated()?
        .update(story::TABLE, &id.to_string(), payload.into_row())
        .await?;
    match updated {
        Some(row) => Ok(Json(json!({ "data": row }))),
        None => Err(ApiError::not_found("Not found")),
    }
}

/// DELETE /api/admin/stories/:id - hard delete; a missing row is a 404, not
/// a false no-content
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .elevated()?
        .delete(story::TABLE, &id.to_string())
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
