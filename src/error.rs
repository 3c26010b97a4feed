// HTTP API Error Types
use axum::{http::HeaderMap, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::config::AppConfig;

/// Upper bound on diagnostic detail attached to error responses.
pub const DIAGNOSTIC_MAX_LEN: usize = 600;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    /// Payload failed schema checks; lists every offending field.
    Validation {
        message: String,
        field_errors: BTreeMap<String, String>,
    },
    /// Id failed the format check before any backend round-trip.
    MalformedId(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    UploadTooLarge { limit: usize },

    // 500 Internal Server Error
    InternalServerError(String),
    /// The live backend schema lacks columns this handler expects, and the
    /// projection-negotiation retries were exhausted.
    SchemaDrift { table: String },
    /// Both blob backends failed. Diagnostics only via the debug opt-in.
    UploadFailed {
        message: String,
        diagnostic: Option<String>,
    },
    /// Backend rejected a write under row-level security. Points the operator
    /// at the elevated-credential configuration, never the raw policy text.
    RlsDenied(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Validation { .. } => 400,
            ApiError::MalformedId(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::UploadTooLarge { .. } => 413,
            ApiError::InternalServerError(_) => 500,
            ApiError::SchemaDrift { .. } => 500,
            ApiError::UploadFailed { .. } => 500,
            ApiError::RlsDenied(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::MalformedId(msg) => msg.clone(),
            ApiError::Unauthorized(msg) => msg.clone(),
            ApiError::Forbidden(msg) => msg.clone(),
            ApiError::NotFound(msg) => msg.clone(),
            ApiError::Conflict(msg) => msg.clone(),
            ApiError::UploadTooLarge { limit } => {
                format!("Upload exceeds the size limit of {} bytes", limit)
            }
            ApiError::InternalServerError(msg) => msg.clone(),
            ApiError::SchemaDrift { table } => format!(
                "Backend schema for '{}' is missing columns this server expects; \
                 the live schema has drifted from the deployed handlers",
                table
            ),
            ApiError::UploadFailed { message, .. } => message.clone(),
            ApiError::RlsDenied(msg) => msg.clone(),
            ApiError::ServiceUnavailable(msg) => msg.clone(),
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Validation { .. } => "VALIDATION_ERROR",
            ApiError::MalformedId(_) => "INVALID_ID",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::UploadTooLarge { .. } => "UPLOAD_TOO_LARGE",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::SchemaDrift { .. } => "SCHEMA_DRIFT",
            ApiError::UploadFailed { .. } => "UPLOAD_FAILED",
            ApiError::RlsDenied(_) => "RLS_DENIED",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut response = json!({
            "error": self.message(),
            "code": self.error_code(),
        });

        if let ApiError::Validation { field_errors, .. } = self {
            response["field_errors"] = json!(field_errors);
        }
        if let ApiError::UploadFailed {
            diagnostic: Some(diag),
            ..
        } = self
        {
            response["diagnostic"] = json!(diag);
        }
        if let ApiError::UploadFailed { message, .. } = self {
            // Upload responses also carry a `message` field on the wire
            response["message"] = json!(message);
        }
        if let ApiError::UploadTooLarge { .. } = self {
            response["message"] = json!(self.message());
        }

        response
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(message: impl Into<String>, field_errors: BTreeMap<String, String>) -> Self {
        ApiError::Validation {
            message: message.into(),
            field_errors,
        }
    }

    pub fn malformed_id() -> Self {
        ApiError::MalformedId("Invalid id".to_string())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    pub fn rls_denied() -> Self {
        ApiError::RlsDenied(
            "The backend rejected this operation under row-level security. \
             Check that BACKEND_SERVICE_KEY is set to the service credential \
             so trusted server writes can bypass row policies"
                .to_string(),
        )
    }
}

/// True when the caller opted into diagnostic detail and the deployment
/// allows it. Production defaults keep this off.
pub fn debug_requested(headers: &HeaderMap, config: &AppConfig) -> bool {
    if !config.api.allow_debug_errors {
        return false;
    }
    headers
        .get("x-debug-errors")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Bound diagnostic payloads and mask anything that looks like a credential
/// before it can reach a response body.
pub fn truncate_diagnostic(detail: &str) -> String {
    let masked = mask_secrets(detail);
    if masked.chars().count() <= DIAGNOSTIC_MAX_LEN {
        return masked;
    }
    let cut: String = masked.chars().take(DIAGNOSTIC_MAX_LEN).collect();
    format!("{}… (truncated)", cut)
}

const SECRET_MARKERS: &[&str] = &["apikey", "api_key", "authorization", "token", "secret", "key"];

fn mask_secrets(detail: &str) -> String {
    let mut out = String::with_capacity(detail.len());
    for line in detail.lines() {
        let lower = line.to_ascii_lowercase();
        let sensitive = SECRET_MARKERS.iter().any(|m| lower.contains(m));
        if sensitive {
            // Keep the key name, mask everything after the separator
            if let Some(pos) = line.find(|c| c == ':' || c == '=') {
                out.push_str(&line[..=pos]);
                out.push_str(" ****");
            } else {
                out.push_str("****");
            }
        } else {
            out.push_str(line);
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

// Convert gateway errors to ApiError at the handler boundary
impl From<crate::gateway::GatewayError> for ApiError {
    fn from(err: crate::gateway::GatewayError) -> Self {
        use crate::gateway::GatewayError;
        match err {
            GatewayError::RowLevelSecurity(detail) => {
                tracing::error!("row-level security denial: {}", detail);
                ApiError::rls_denied()
            }
            GatewayError::SchemaDrift { table } => ApiError::SchemaDrift { table },
            GatewayError::MissingColumn { column } => {
                // A stray missing-column error outside the negotiation loop
                // still means the schema has drifted.
                tracing::error!("unnegotiated missing column: {}", column);
                ApiError::SchemaDrift { table: column }
            }
            GatewayError::MissingCredential(msg) => ApiError::internal_server_error(msg),
            GatewayError::Transport(detail) => {
                tracing::error!("backend transport failure: {}", detail);
                ApiError::service_unavailable("Content backend temporarily unavailable")
            }
            GatewayError::Backend { status, message } => {
                tracing::error!("backend error {}: {}", status, message);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::content::FieldErrors> for ApiError {
    fn from(errors: crate::content::FieldErrors) -> Self {
        ApiError::validation("Validation failed", errors.into_map())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
