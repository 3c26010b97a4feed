//! Session identity resolution.
//!
//! Sessions are JWT access tokens minted by the hosted backend's auth
//! service and carried in a cookie (or a Bearer header for API clients).
//! This module only establishes identity; authorization is the admin gate's
//! job, and the role always comes from an elevated-tier profile lookup,
//! never from anything the client sent.

pub mod account;

use axum::http::HeaderMap;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AppConfig;

/// Table holding per-user profile rows; `role` there is the sole
/// authorization signal for admin routes.
pub const PROFILES_TABLE: &str = "user_profiles";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Auth identity id.
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    pub exp: i64,
}

/// Decode and verify a session token. Expired or malformed tokens resolve to
/// no identity rather than an error; callers treat both the same way.
pub fn decode_session(token: &str, secret: &str) -> Option<SessionClaims> {
    if secret.is_empty() {
        tracing::warn!("BACKEND_JWT_SECRET is empty; refusing to accept any session");
        return None;
    }
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();
    decode::<SessionClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Resolve the caller's session from transport credentials: the session
/// cookie first, then an `Authorization: Bearer` header.
pub fn session_from_headers(headers: &HeaderMap, config: &AppConfig) -> Option<SessionClaims> {
    let token = cookie_value(headers, &config.session.cookie_name)
        .or_else(|| bearer_token(headers))?;
    decode_session(&token, &config.backend.jwt_secret)
}

fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let raw = headers.get("cookie")?.to_str().ok()?;
    for pair in raw.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(name) {
            let value = parts.next().unwrap_or("");
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let raw = headers.get("authorization")?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
