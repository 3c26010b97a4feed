use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::content::settings::{self, validate_hero_list, HeroImage};
use crate::error::ApiError;
use crate::gateway::SelectQuery;
use crate::state::AppState;

/// GET /api/admin/settings/hero - always 200 with an array, empty on absence
pub async fn hero_get(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let elevated = state.elevated()?;
    let query = SelectQuery::new()
        .columns(["key", "value"])
        .eq(settings::KEY_COLUMN, settings::HERO_KEY)
        .limit(1);
    let rows = elevated.select(settings::TABLE, &query).await?;
    let hero = settings::hero_from_value(rows.first().and_then(|row| row.get("value")));
    Ok(Json(json!({ "hero": hero })))
}

#[derive(Debug, Deserialize)]
pub struct HeroPut {
    pub hero: Value,
}

/// PUT /api/admin/settings/hero - replace the hero list wholesale
pub async fn hero_put(
    State(state): State<AppState>,
    Json(body): Json<HeroPut>,
) -> Result<Json<Value>, ApiError> {
    if !body.hero.is_array() {
        return Err(ApiError::bad_request("hero must be an array"));
    }
    let items: Vec<HeroImage> = serde_json::from_value(body.hero)
        .map_err(|e| ApiError::bad_request(format!("invalid hero entry: {}", e)))?;
    validate_hero_list(&items)?;

    let row = json!({
        settings::KEY_COLUMN: settings::HERO_KEY,
        "value": items,
    });
    let saved = state
        .elevated()?
        .upsert_on(settings::TABLE, settings::KEY_COLUMN, row)
        .await?;

    // Echo back the normalized list so PUT-then-GET round-trips exactly.
    let hero = settings::hero_from_value(saved.get("value"));
    Ok(Json(json!({ "success": true, "data": hero })))
}
