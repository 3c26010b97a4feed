use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use crate::content::event::{self, EventCreate, EventPatch};
use crate::error::ApiError;
use crate::gateway::{select_with_negotiation, Order, SelectQuery};
use crate::handlers::ListQuery;
use crate::middleware::AdminUser;
use crate::state::AppState;

use super::{fetch_by_id, parse_id};

/// GET /api/admin/events - all events including drafts, soonest start first
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Result<Json<Value>, ApiError> {
    let elevated = state.elevated()?.clone();
    let mut query = SelectQuery::new()
        .columns(event::COLUMNS.iter().copied())
        .order("start_date", Order::Asc);
    query = ListQuery::apply_eq(query, "event_type", params.category.as_ref());
    query = ListQuery::apply_eq(query, "state", params.state.as_ref());
    query = params.apply_featured(query);
    query = params.apply_search(query, event::SEARCH_COLUMNS);

    let rows = select_with_negotiation(&elevated, event::TABLE, query).await?;
    Ok(Json(json!({ "data": rows })))
}

/// GET /api/admin/events/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    let elevated = state.elevated()?.clone();
    let row = fetch_by_id(&elevated, event::TABLE, event::COLUMNS, id).await?;
    Ok(Json(json!({ "data": row })))
}

/// POST /api/admin/events - the creating admin becomes the owner
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(payload): Json<EventCreate>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;
    let row = state
        .elevated()?
        .insert(event::TABLE, payload.into_row(admin.user_id))
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "data": row }))))
}

/// PATCH /api/admin/events/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<EventPatch>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id)?;
    payload.validate()?;
    let updated = state
        .elevated()?
        .update(event::TABLE, &id.to_string(), payload.into_row())
        .await?;
    match updated {
        Some(row) => Ok(Json(json!({ "data": row }))),
        None => Err(ApiError::not_found("Not found")),
    }
}

/// DELETE /api/admin/events/:id
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;
    let deleted = state
        .elevated()?
        .delete(event::TABLE, &id.to_string())
        .await?;
    if deleted == 0 {
        return Err(ApiError::not_found("Not found"));
    }
    Ok(StatusCode::NO_CONTENT)
}
