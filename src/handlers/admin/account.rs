//! Account-credential endpoints for the signed-in admin.

use axum::{
    extract::{Extension, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::account::AccountError;
use crate::error::ApiError;
use crate::middleware::AdminUser;
use crate::state::AppState;

const PASSWORD_MIN_LEN: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// POST /api/admin/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let current = body
        .current_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("Current password is required"))?;
    let new = body
        .new_password
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::bad_request("New password is required"))?;

    if new.chars().count() < PASSWORD_MIN_LEN {
        return Err(ApiError::bad_request(format!(
            "New password is too short; it must be at least {} characters",
            PASSWORD_MIN_LEN
        )));
    }
    if let Some(confirm) = body.confirm_password {
        if confirm != new {
            return Err(ApiError::bad_request("Password confirmation mismatch"));
        }
    }

    let email = admin.email.clone().ok_or_else(|| {
        ApiError::internal_server_error("Session does not carry an email address")
    })?;

    if !state
        .accounts
        .verify_password(&email, &current)
        .await
        .map_err(account_error)?
    {
        return Err(ApiError::unauthorized("Current password is incorrect"));
    }

    state
        .accounts
        .set_password(admin.user_id, &new)
        .await
        .map_err(account_error)?;

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEmailRequest {
    pub current_password: Option<String>,
    pub new_email: Option<String>,
}

/// POST /api/admin/auth/change-email
pub async fn change_email(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(body): Json<ChangeEmailRequest>,
) -> Result<Json<Value>, ApiError> {
    let new_email = body
        .new_email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .ok_or_else(|| ApiError::bad_request("New email is required"))?;

    if !new_email.contains('@') || new_email.starts_with('@') || new_email.ends_with('@') {
        return Err(ApiError::bad_request("New email is not a valid address"));
    }

    // Re-authenticate before a contact change when the caller supplied the
    // current password; sessions alone cannot prove it.
    if let Some(current) = body.current_password.filter(|p| !p.is_empty()) {
        let email = admin.email.clone().ok_or_else(|| {
            ApiError::internal_server_error("Session does not carry an email address")
        })?;
        if !state
            .accounts
            .verify_password(&email, &current)
            .await
            .map_err(account_error)?
        {
            return Err(ApiError::unauthorized("Current password is incorrect"));
        }
    }

    state
        .accounts
        .set_email(admin.user_id, &new_email)
        .await
        .map_err(account_error)?;

    Ok(Json(json!({ "success": true })))
}

fn account_error(err: AccountError) -> ApiError {
    match err {
        AccountError::DuplicateEmail => ApiError::conflict("Email already in use"),
        AccountError::Unconfigured(msg) => ApiError::internal_server_error(msg),
        AccountError::Backend(detail) => {
            tracing::error!("auth service failure: {}", detail);
            ApiError::internal_server_error("Account service temporarily unavailable")
        }
    }
}
