//! Admin authentication extractor.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use bannerd_core::Caller;

use super::auth::{AuthState, BearerAuth};
use crate::error::AuthError;

/// An authenticated caller with the admin flag set.
///
/// 401 for the same reasons as [`BearerAuth`]; 403 for a valid token
/// without admin rights.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub Caller);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: Send + Sync,
    AuthState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let BearerAuth(caller) = BearerAuth::from_request_parts(parts, state).await?;

        if !caller.is_admin {
            tracing::debug!(user = %caller.name, "Admin access denied");
            return Err(AuthError::forbidden("Admin access required"));
        }

        Ok(Self(caller))
    }
}
