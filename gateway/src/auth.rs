//! Bearer token authentication for the `/api` routes

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::api::ApiError;
use crate::http_server::AppState;
use crate::session::store::token_hint;
use crate::session::{Session, SessionError};

/// Why a request was refused before reaching a handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No `Authorization: Bearer` header
    MissingToken,
    /// The token did not resolve to a live session
    SessionExpired,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "No active session",
            AuthError::SessionExpired => "Session expired",
        };
        ApiError::unauthorized(message).into_response()
    }
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// A bare `Bearer ` yields an empty token, which no session ever matches.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::trim)
}

/// The live session behind the request's bearer token
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AuthError::MissingToken)?;

        match state.sessions.lookup(token).await {
            Ok(session) => Ok(AuthSession(session)),
            Err(SessionError::NotFound) => {
                debug!(token = token_hint(token), "Unknown session token");
                Err(AuthError::SessionExpired)
            }
            Err(SessionError::Expired(at)) => {
                debug!(token = token_hint(token), expired_at = %at, "Session expired");
                Err(AuthError::SessionExpired)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc-123")), Some("abc-123"));
        assert_eq!(bearer_token(&headers("Bearer  padded ")), Some("padded"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), Some(""));
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
