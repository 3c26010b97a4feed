//! Session-introspection endpoint.
//!
//! `whoami` exists so clients can refresh their "is admin" UI hint from the
//! server instead of persisting a client-side flag; nothing it returns
//! carries trust weight - the admin gate re-checks the role on every admin
//! request.

use axum::{extract::State, http::HeaderMap, Json};
use serde_json::{json, Value};

use crate::auth::session_from_headers;
use crate::middleware::admin::lookup_role;
use crate::state::AppState;

/// GET /api/auth/whoami
pub async fn whoami(State(state): State<AppState>, headers: HeaderMap) -> Json<Value> {
    let Some(claims) = session_from_headers(&headers, &state.config) else {
        return Json(json!({ "authenticated": false, "role": "anonymous" }));
    };

    // A failed lookup degrades the hint to the least privileged role; the
    // gate, not this endpoint, decides access.
    let role = match lookup_role(&state, &claims).await {
        Ok(Some(role)) => role,
        Ok(None) => "user".to_string(),
        Err(err) => {
            tracing::warn!("whoami role lookup failed: {}", err);
            "user".to_string()
        }
    };

    Json(json!({
        "authenticated": true,
        "user_id": claims.sub,
        "email": claims.email,
        "role": role,
    }))
}
