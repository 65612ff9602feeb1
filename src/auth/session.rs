//! Session tokens and the session cookie.
//!
//! The raw token only ever lives in the client's cookie; the store keeps its
//! SHA-256 hash.

use anyhow::{Context, Result};
use axum::http::{
    HeaderMap, HeaderValue,
    header::{AUTHORIZATION, COOKIE, InvalidHeaderValue},
};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{RngCore, rngs::OsRng};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use utoipa::ToSchema;
use uuid::Uuid;

use super::AuthConfig;
use crate::store::{SessionRecord, StoreError, UserStore};

pub const SESSION_COOKIE_NAME: &str = "quizgate_session";

/// The authenticated identity attached to a request.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
}

impl From<SessionRecord> for Session {
    fn from(record: SessionRecord) -> Self {
        Self {
            user_id: record.user_id,
            email: record.email,
        }
    }
}

/// Create a new random session token.
///
/// # Errors
/// Returns an error if the OS RNG fails.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[must_use]
pub fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}

/// Persist a new session for `user_id` and return the raw token.
///
/// # Errors
/// Returns [`StoreError::Internal`] if the token cannot be generated or stored.
pub async fn issue_session<S: UserStore>(
    store: &S,
    config: &AuthConfig,
    user_id: Uuid,
) -> Result<String, StoreError> {
    let token = generate_session_token().map_err(|e| {
        tracing::error!("{e:#}");
        StoreError::Internal
    })?;
    store
        .create_session(
            user_id,
            hash_session_token(&token),
            config.session_ttl_seconds(),
        )
        .await?;
    Ok(token)
}

/// Resolve the request's session, if it carries a live one.
///
/// # Errors
/// Returns [`StoreError::Internal`] if the store lookup fails.
pub async fn resolve_session<S: UserStore>(
    store: &S,
    headers: &HeaderMap,
) -> Result<Option<Session>, StoreError> {
    let Some(token) = extract_session_token(headers) else {
        return Ok(None);
    };
    let record = store.find_session(hash_session_token(&token)).await?;
    Ok(record.map(Session::from))
}

/// Revoke the request's session. Missing sessions are fine.
///
/// # Errors
/// Returns [`StoreError::Internal`] if the store delete fails.
pub async fn revoke_session<S: UserStore>(store: &S, headers: &HeaderMap) -> Result<(), StoreError> {
    match extract_session_token(headers) {
        Some(token) => store.delete_session(hash_session_token(&token)).await,
        None => Ok(()),
    }
}

/// Build the `Set-Cookie` value carrying a session token.
///
/// # Errors
/// Returns an error if the token contains characters invalid in a header.
pub fn session_cookie(config: &AuthConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// # Errors
/// Never in practice; the value is built from constants.
pub fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Read the session token from a bearer header or the session cookie.
#[must_use]
pub fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(val.to_string());
                }
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
