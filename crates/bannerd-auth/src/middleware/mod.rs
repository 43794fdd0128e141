//! Axum extractors for authenticated routes.
//!
//! ```ignore
//! async fn list(AdminAuth(caller): AdminAuth) -> impl IntoResponse { /* ... */ }
//! async fn fetch(BearerAuth(caller): BearerAuth) -> impl IntoResponse { /* ... */ }
//!
//! let app = Router::new()
//!     .route("/banner", get(list))
//!     .route("/user_banner", get(fetch))
//!     .with_state(app_state); // AuthState: FromRef<AppState>
//! ```

pub mod admin;
pub mod auth;
pub mod error;

pub use admin::AdminAuth;
pub use auth::{AuthState, BearerAuth};
