//! Admin authorization gate.
//!
//! Every admin-prefixed route passes through here. The caller's session is
//! resolved from transport credentials, then the role is looked up from the
//! profile table on the **elevated** tier - the session's own credential may
//! be blocked by row policies from reading its role row. Any lookup failure
//! denies: this gate fails closed.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use uuid::Uuid;

use crate::auth::{self, SessionClaims, PROFILES_TABLE, ROLE_ADMIN};
use crate::error::ApiError;
use crate::gateway::SelectQuery;
use crate::state::AppState;

/// Authorized admin identity, injected into request extensions for
/// downstream handlers.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub role: String,
}

enum Denial {
    NoSession,
    NotAdmin,
}

pub async fn admin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    // API callers get JSON errors; browser-facing admin pages get redirects.
    let api_request = request.uri().path().starts_with("/api/");

    match resolve_admin(&state, request.headers()).await {
        Ok(admin) => {
            request.extensions_mut().insert(admin);
            next.run(request).await
        }
        Err(Denial::NoSession) => {
            if api_request {
                ApiError::unauthorized("Authentication required").into_response()
            } else {
                Redirect::to("/login").into_response()
            }
        }
        Err(Denial::NotAdmin) => {
            if api_request {
                ApiError::unauthorized("Admin access required").into_response()
            } else {
                Redirect::to("/unauthorized").into_response()
            }
        }
    }
}

async fn resolve_admin(
    state: &AppState,
    headers: &axum::http::HeaderMap,
) -> Result<AdminUser, Denial> {
    let claims = auth::session_from_headers(headers, &state.config).ok_or(Denial::NoSession)?;

    match lookup_role(state, &claims).await {
        Ok(Some(role)) if role == ROLE_ADMIN => Ok(AdminUser {
            user_id: claims.sub,
            email: claims.email,
            role,
        }),
        Ok(_) => Err(Denial::NotAdmin),
        Err(err) => {
            // Fail closed: a broken lookup must never grant access.
            tracing::error!("admin role lookup failed: {}", err);
            Err(Denial::NotAdmin)
        }
    }
}

pub(crate) async fn lookup_role(
    state: &AppState,
    claims: &SessionClaims,
) -> Result<Option<String>, ApiError> {
    let elevated = state.elevated()?;
    let query = SelectQuery::new()
        .columns(["user_id", "role"])
        .eq("user_id", claims.sub.to_string())
        .limit(1);
    let rows = elevated.select(PROFILES_TABLE, &query).await?;
    Ok(rows
        .first()
        .and_then(|row| row.get("role"))
        .and_then(|v| v.as_str())
        .map(str::to_string))
}
