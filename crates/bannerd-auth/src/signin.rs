//! Sign-in: exchanges a known user name for a bearer token.

use std::sync::Arc;

use bannerd_storage::DynUserStorage;
use tracing::{debug, error};

use crate::error::AuthError;
use crate::token::JwtService;

#[derive(Clone)]
pub struct SigninService {
    users: DynUserStorage,
    jwt: Arc<JwtService>,
}

impl SigninService {
    pub fn new(users: DynUserStorage, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    /// Issues a fresh token for `name`.
    ///
    /// # Errors
    ///
    /// `UnknownUser` if the store has no such user, `Internal` if the store
    /// or signing fails.
    pub async fn sign_in(&self, name: &str) -> Result<String, AuthError> {
        let user = self
            .users
            .find_by_name(name)
            .await
            .map_err(|e| {
                error!(error = %e, "user lookup failed during sign-in");
                AuthError::from(e)
            })?
            .ok_or_else(|| AuthError::unknown_user(name))?;

        let token = self.jwt.issue(&user).map_err(|e| {
            error!(error = %e, "failed to sign token");
            AuthError::internal(e.to_string())
        })?;

        debug!(
            user = %user.name,
            is_admin = user.is_admin,
            ttl_secs = self.jwt.ttl().whole_seconds(),
            "issued token"
        );
        Ok(token)
    }
}
