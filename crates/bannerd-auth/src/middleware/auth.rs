//! Bearer token authentication extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use bannerd_core::Caller;

use crate::error::AuthError;
use crate::token::JwtService;

/// State required for bearer token authentication.
///
/// Include it in the application state and expose it via `FromRef`.
#[derive(Debug, Clone)]
pub struct AuthState {
    pub jwt_service: Arc<JwtService>,
}

impl AuthState {
    pub fn new(jwt_service: Arc<JwtService>) -> Self {
        Self { jwt_service }
    }
}

/// Any authenticated caller.
///
/// Rejects with 401 when the `Authorization: Bearer <token>` header is
/// missing, malformed, or carries an invalid or expired token.
#[derive(Debug, Clone)]
pub struct BearerAuth(pub Caller);

impl<S> FromRequestParts<S> for BearerAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = AuthState::from_ref(state);

        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or_else(|| AuthError::unauthorized("Missing Authorization header"))?
            .to_str()
            .map_err(|_| AuthError::unauthorized("Malformed Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::unauthorized("Expected a Bearer token"))?;

        let claims = auth_state.jwt_service.decode(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode token");
            AuthError::invalid_token(e.to_string())
        })?;

        Ok(Self(claims.into()))
    }
}
