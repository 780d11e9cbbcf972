// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// Token-level failures keep their precise variant so that it can be logged,
/// but they all collapse to a single `unauthenticated` response on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No authorization header, or an empty bearer value
    MissingToken,
    /// Authorization header present but not `Bearer <token>`
    InvalidAuthHeader,
    /// Token cannot be parsed or lacks required claims
    MalformedToken,
    /// Token signature does not verify under the current key
    InvalidSignature,
    /// `now >= exp`
    TokenExpired,
    /// The issuing node rejected the token or could not be reached
    Unauthenticated,
    /// Unknown username or wrong password
    InvalidCredentials,
    /// Authenticated, but the policy denies the action
    Forbidden,
    /// Token could not be signed
    SigningFailed(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Precise reason, for logs only.
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "missing_token",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::Unauthenticated => "introspection_rejected",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Forbidden => "forbidden",
            AuthError::SigningFailed(_) => "signing_failed",
        }
    }

    /// Error code sent to the caller.
    pub fn error_code(&self) -> &'static str {
        if self.is_unauthenticated() {
            return "unauthenticated";
        }
        self.reason()
    }

    /// Whether this is one of the token-level failures that are reported
    /// identically to the caller.
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            AuthError::MissingToken
                | AuthError::InvalidAuthHeader
                | AuthError::MalformedToken
                | AuthError::InvalidSignature
                | AuthError::TokenExpired
                | AuthError::Unauthenticated
        )
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            _ if self.is_unauthenticated() => StatusCode::UNAUTHORIZED,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            _ if self.is_unauthenticated() => write!(f, "Authentication required"),
            AuthError::InvalidCredentials => write!(f, "Invalid username or password"),
            AuthError::Forbidden => write!(f, "Insufficient permissions for this operation"),
            AuthError::SigningFailed(msg) => write!(f, "Failed to sign token: {msg}"),
            _ => write!(f, "Authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(reason = self.reason(), error = %self, "Authentication failure");
        } else {
            tracing::debug!(reason = self.reason(), "Request rejected");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AuthError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn token_failures_are_indistinguishable_on_the_wire() {
        let expected = body_of(AuthError::MissingToken).await;
        assert_eq!(expected.0, StatusCode::UNAUTHORIZED);
        assert_eq!(expected.1["error_code"], "unauthenticated");

        for err in [
            AuthError::InvalidAuthHeader,
            AuthError::MalformedToken,
            AuthError::InvalidSignature,
            AuthError::TokenExpired,
            AuthError::Unauthenticated,
        ] {
            assert_eq!(body_of(err).await, expected);
        }
    }

    #[tokio::test]
    async fn forbidden_returns_403() {
        let (status, body) = body_of(AuthError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error_code"], "forbidden");
    }

    #[tokio::test]
    async fn invalid_credentials_returns_401_with_own_code() {
        let (status, body) = body_of(AuthError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error_code"], "invalid_credentials");
    }

    #[test]
    fn reason_keeps_precise_variant() {
        assert_eq!(AuthError::TokenExpired.reason(), "token_expired");
        assert_eq!(AuthError::TokenExpired.error_code(), "unauthenticated");
    }
}
