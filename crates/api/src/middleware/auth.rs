//! Session-cookie guard for mutating handlers.
//!
//! Authentication itself happens upstream; the API only checks that the
//! session cookie named by `AUTH_COOKIE_NAME` is present and non-empty.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use crate::error::AppError;
use crate::state::AppState;

/// Marker extractor: the request carries a session cookie.
///
/// ```ignore
/// async fn create(_session: RequireSession, State(state): State<AppState>) -> AppResult<..> {
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireSession;

/// Find a cookie value by name across all `Cookie` headers.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

impl FromRequestParts<AppState> for RequireSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match cookie_value(&parts.headers, &state.config.auth_cookie_name) {
            Some(value) if !value.is_empty() => Ok(RequireSession),
            _ => Err(AppError::Unauthorized("Sign in required".into())),
        }
    }
}
