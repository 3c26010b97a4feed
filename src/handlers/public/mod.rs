//! Public rendering endpoints.
//!
//! Everything here reads through the scoped (anonymous) gateway, sees only
//! published rows, and never surfaces an error to the caller: a failed
//! backend read degrades to an empty result so the public site renders a
//! placeholder instead of an error page.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::{json, Value};

use crate::content::{event, images, page, settings, site, story, STATUS_PUBLISHED};
use crate::gateway::{select_with_negotiation, Order, SelectQuery};
use crate::state::AppState;

use super::ListQuery;

/// GET /api/stories - published stories, newest first
pub async fn stories_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Value> {
    let mut query = SelectQuery::new()
        .columns(story::COLUMNS.iter().copied())
        .eq("published", "true")
        .order("created_at", Order::Desc);
    query = ListQuery::apply_eq(query, "category", params.category.as_ref());
    query = params.apply_search(query, story::SEARCH_COLUMNS);

    Json(Value::Array(
        fetch_published(&state, story::TABLE, query).await,
    ))
}

/// GET /api/stories/:slug - a single published story
pub async fn story_get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let query = SelectQuery::new()
        .columns(story::COLUMNS.iter().copied())
        .eq("slug", slug)
        .eq("published", "true")
        .limit(1);

    match fetch_published(&state, story::TABLE, query).await.pop() {
        Some(row) => Json(json!({ "data": row })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not found", "code": "NOT_FOUND" })),
        )
            .into_response(),
    }
}

/// GET /api/pages - published pages
pub async fn pages_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Value> {
    let mut query = SelectQuery::new()
        .columns(page::COLUMNS.iter().copied())
        .eq("published", "true")
        .order("created_at", Order::Desc);
    query = params.apply_search(query, page::SEARCH_COLUMNS);

    Json(Value::Array(
        fetch_published(&state, page::TABLE, query).await,
    ))
}

/// GET /api/pages/:slug - a single published page
pub async fn page_get(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> impl IntoResponse {
    let query = SelectQuery::new()
        .columns(page::COLUMNS.iter().copied())
        .eq("slug", slug)
        .eq("published", "true")
        .limit(1);

    match fetch_published(&state, page::TABLE, query).await.pop() {
        Some(row) => Json(json!({ "data": row })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Not found", "code": "NOT_FOUND" })),
        )
            .into_response(),
    }
}

/// GET /api/sites - published cultural sites
pub async fn sites_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Value> {
    let mut query = SelectQuery::new()
        .columns(site::COLUMNS.iter().copied())
        .eq("status", STATUS_PUBLISHED)
        .order("created_at", Order::Desc);
    query = ListQuery::apply_eq(query, "category", params.category.as_ref());
    query = ListQuery::apply_eq(query, "state", params.state.as_ref());
    query = params.apply_featured(query);
    query = params.apply_search(query, site::SEARCH_COLUMNS);

    Json(Value::Array(
        fetch_published(&state, site::TABLE, query).await,
    ))
}

/// GET /api/events - published events, soonest start first
pub async fn events_list(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> Json<Value> {
    let mut query = SelectQuery::new()
        .columns(event::COLUMNS.iter().copied())
        .eq("status", STATUS_PUBLISHED)
        .order("start_date", Order::Asc);
    // Events categorize by type rather than a category column.
    query = ListQuery::apply_eq(query, "event_type", params.category.as_ref());
    query = ListQuery::apply_eq(query, "state", params.state.as_ref());
    query = params.apply_featured(query);
    query = params.apply_search(query, event::SEARCH_COLUMNS);

    Json(Value::Array(
        fetch_published(&state, event::TABLE, query).await,
    ))
}

/// GET /api/settings/hero - homepage hero images; always 200, empty on
/// absence or failure
pub async fn hero_get(State(state): State<AppState>) -> Json<Value> {
    let query = SelectQuery::new()
        .columns(["key", "value"])
        .eq(settings::KEY_COLUMN, settings::HERO_KEY)
        .limit(1);

    let hero = match state.scoped.select(settings::TABLE, &query).await {
        Ok(rows) => settings::hero_from_value(rows.first().and_then(|row| row.get("value"))),
        Err(err) => {
            tracing::warn!("hero settings read failed, rendering empty: {}", err);
            vec![]
        }
    };

    Json(json!({ "hero": hero }))
}

/// Shared read path: negotiated projection, image normalization, and the
/// degrade-to-empty policy.
async fn fetch_published(state: &AppState, table: &str, query: SelectQuery) -> Vec<Value> {
    match select_with_negotiation(&state.scoped, table, query).await {
        Ok(mut rows) => {
            for row in &mut rows {
                images::normalize_row_images(
                    row,
                    &state.config.backend.url,
                    &state.config.uploads.bucket,
                );
            }
            rows
        }
        Err(err) => {
            tracing::warn!(table = table, "public read failed, rendering empty: {}", err);
            vec![]
        }
    }
}
