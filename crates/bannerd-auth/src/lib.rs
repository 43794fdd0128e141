//! Authentication for bannerd.
//!
//! - [`token`]: HS256 token issuance and validation
//! - [`signin`]: exchanges a user name for a token
//! - [`middleware`]: axum extractors that turn a bearer token into a
//!   [`Caller`](bannerd_core::Caller)
//!
//! Callers are rebuilt from token claims alone; no store lookup happens per
//! request.

pub mod error;
pub mod middleware;
pub mod signin;
pub mod token;

pub use error::AuthError;
pub use middleware::{AdminAuth, AuthState, BearerAuth};
pub use signin::SigninService;
pub use token::{Claims, JwtError, JwtService};
