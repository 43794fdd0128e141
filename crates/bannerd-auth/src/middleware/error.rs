//! `IntoResponse` for [`AuthError`]: `{"error": "..."}` bodies.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::AuthError;

/// Message shown for failures whose cause must not reach the caller.
const INTERNAL_MESSAGE: &str = "internal server error, try again later";

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let challenge = self.is_unauthenticated();
        let (status, message) = match &self {
            AuthError::Unauthorized { message } | AuthError::InvalidToken { message } => {
                (StatusCode::UNAUTHORIZED, message.clone())
            }
            AuthError::UnknownUser { .. } => (StatusCode::UNAUTHORIZED, "unknown user".to_string()),
            AuthError::Forbidden { message } => (StatusCode::FORBIDDEN, message.clone()),
            AuthError::Internal { message } => {
                tracing::error!(error = %message, "authentication failed internally");
                (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
            }
        };

        let mut response = (status, Json(json!({ "error": message }))).into_response();

        if challenge {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer realm=\"bannerd\""),
            );
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AuthError::unauthorized("x"), StatusCode::UNAUTHORIZED),
            (AuthError::invalid_token("x"), StatusCode::UNAUTHORIZED),
            (AuthError::unknown_user("x"), StatusCode::UNAUTHORIZED),
            (AuthError::forbidden("x"), StatusCode::FORBIDDEN),
            (AuthError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_www_authenticate_on_401() {
        let response = AuthError::unauthorized("missing").into_response();
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));

        let response = AuthError::forbidden("nope").into_response();
        assert!(!response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
