//! Request authentication.

use crate::auth::User;
use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use std::sync::Arc;
use tracing::debug;

/// Header name for API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Extractor resolving the caller from its API key.
///
/// Rejects with 401 when no key is supplied or the key is unknown.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub User);

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let key = extract_api_key(&parts.headers).ok_or(ApiError::Unauthorized)?;

        match state.identities.authenticate(&key) {
            Some(user) => Ok(AuthenticatedUser(user)),
            None => {
                debug!("Rejected unknown API key on {}", parts.uri.path());
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Extract the API key from `X-API-Key` or an `Authorization: Bearer` header.
fn extract_api_key(headers: &HeaderMap) -> Option<String> {
    if let Some(key) = headers.get(API_KEY_HEADER)
        && let Ok(value) = key.to_str()
        && !value.is_empty()
    {
        return Some(value.to_string());
    }

    if let Some(auth) = headers.get("Authorization")
        && let Ok(value) = auth.to_str()
        && let Some(token) = value.strip_prefix("Bearer ")
    {
        return Some(token.trim().to_string());
    }

    None
}
