pub mod auth;
pub mod config;
pub mod content;
pub mod error;
pub mod gateway;
pub mod handlers;
pub mod middleware;
pub mod state;
pub mod upload;
pub mod workflow;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::gateway::SelectQuery;
use crate::state::AppState;

/// Build the complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        .merge(auth_routes())
        .merge(admin_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api/stories", get(public::stories_list))
        .route("/api/stories/:slug", get(public::story_get))
        .route("/api/pages", get(public::pages_list))
        .route("/api/pages/:slug", get(public::page_get))
        .route("/api/sites", get(public::sites_list))
        .route("/api/events", get(public::events_list))
        .route("/api/settings/hero", get(public::hero_get))
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/api/auth/whoami", get(handlers::auth::whoami))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    use handlers::admin::{account, events, pages, settings, sites, stories, uploads};

    // Bodies above the upload ceiling must reach the handler so the caller
    // gets the explicit 413 with the limit in the message; leave headroom
    // over axum's default body cap.
    let body_cap = state.config.uploads.max_bytes.saturating_add(1024 * 1024);

    Router::new()
        .route(
            "/api/admin/stories",
            get(stories::list).post(stories::create),
        )
        .route(
            "/api/admin/stories/:id",
            get(stories::get)
                .patch(stories::update)
                .delete(stories::remove),
        )
        .route("/api/admin/pages", get(pages::list).post(pages::create))
        .route(
            "/api/admin/pages/:id",
            get(pages::get).patch(pages::update).delete(pages::remove),
        )
        .route("/api/admin/events", get(events::list).post(events::create))
        .route(
            "/api/admin/events/:id",
            get(events::get)
                .patch(events::update)
                .delete(events::remove),
        )
        .route("/api/admin/sites", get(sites::list).post(sites::create))
        .route(
            "/api/admin/sites/:id",
            get(sites::get).patch(sites::update).delete(sites::remove),
        )
        .route(
            "/api/admin/settings/hero",
            get(settings::hero_get).put(settings::hero_put),
        )
        .route(
            "/api/admin/uploads",
            post(uploads::upload).layer(DefaultBodyLimit::max(body_cap)),
        )
        .route(
            "/api/admin/auth/change-password",
            post(account::change_password),
        )
        .route("/api/admin/auth/change-email", post(account::change_email))
        .route_layer(from_fn_with_state(state, middleware::admin_gate))
}

async fn root() -> Json<Value> {
    Json(json!({
        "name": "cts-api",
        "description": "Culture and tourism content API",
        "endpoints": {
            "public": "/api/stories, /api/pages, /api/sites, /api/events, /api/settings/hero",
            "auth": "/api/auth/whoami",
            "admin": "/api/admin/*",
        },
    }))
}

/// Liveness plus a cheap backend probe through the anonymous credential.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let probe = SelectQuery::new().columns(["id"]).limit(1);
    match state.scoped.select("site_settings", &probe).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "status": "healthy", "backend": "reachable" })),
        ),
        Err(err) => {
            tracing::warn!("health probe failed: {}", err);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "backend": "unreachable" })),
            )
        }
    }
}
