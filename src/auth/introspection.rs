// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token introspection against the auth node.
//!
//! Resource nodes hold no signing key. For every request they forward the
//! presented bearer token to the auth node's `/validate` endpoint and trust
//! the answer for that request only.
//!
//! ## Security
//!
//! - Fail-closed: an unreachable or slow auth node is reported to callers
//!   exactly like an invalid token. The difference is only visible in logs.
//! - Answers are never cached across requests.

use std::time::Duration;

use reqwest::Client;
use url::Url;

use super::{AuthError, Identity};
use crate::models::ValidateResponse;
use crate::upstream::{self, UpstreamError};

#[derive(Debug, Clone)]
pub struct IntrospectionClient {
    http: Client,
    validate_url: Url,
    timeout: Duration,
}

impl IntrospectionClient {
    /// Build a client for the auth node at `auth_base_url`.
    pub fn new(auth_base_url: &Url, timeout: Duration) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: upstream::build_client(timeout)?,
            validate_url: upstream::endpoint(auth_base_url, "validate")?,
            timeout,
        })
    }

    /// Ask the auth node who `token` belongs to.
    pub async fn introspect(&self, token: &str) -> Result<Identity, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingToken);
        }

        let response = self
            .http
            .get(self.validate_url.clone())
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                let err = UpstreamError::from_transport("auth", e);
                tracing::warn!(error = %err, "Introspection failed, treating request as unauthenticated");
                AuthError::Unauthenticated
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "Auth node rejected token");
            return Err(AuthError::Unauthenticated);
        }

        let body: ValidateResponse = response.json().await.map_err(|e| {
            let err = UpstreamError::from_body("auth", e);
            tracing::warn!(error = %err, "Introspection answer unreadable");
            AuthError::Unauthenticated
        })?;

        if body.status != ValidateResponse::VALID || body.username.is_empty() {
            tracing::warn!(status = %body.status, "Introspection answer not valid");
            return Err(AuthError::Unauthenticated);
        }

        Ok(Identity::new(body.username, body.role))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api;
    use crate::auth::{CredentialStore, Role, SigningKey, TokenService};
    use crate::state::AuthNodeState;
    use crate::test_support::{closed_port_url, spawn_router};
    use axum::{routing::get, Router};

    fn token_service() -> TokenService {
        TokenService::new(
            CredentialStore::seeded(),
            &SigningKey::from_secret("introspection-test-key-0123456789"),
        )
    }

    #[tokio::test]
    async fn resolves_identity_from_live_auth_node() {
        let tokens = token_service();
        let base = spawn_router(api::auth::router(AuthNodeState::new(tokens.clone()))).await;
        let client = IntrospectionClient::new(&base, Duration::from_secs(2)).unwrap();

        let issued = tokens.issue("faculty1", "pass123").unwrap();
        let identity = client.introspect(&issued.token).await.unwrap();
        assert_eq!(identity, Identity::new("faculty1", Role::Faculty));
    }

    #[tokio::test]
    async fn rejected_token_is_unauthenticated() {
        let base = spawn_router(api::auth::router(AuthNodeState::new(token_service()))).await;
        let client = IntrospectionClient::new(&base, Duration::from_secs(2)).unwrap();

        let err = client.introspect("garbage.token.value").await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn unreachable_auth_node_fails_closed() {
        let base = closed_port_url().await;
        let client = IntrospectionClient::new(&base, Duration::from_millis(500)).unwrap();

        let issued = token_service().issue("student1", "pass123").unwrap();
        let err = client.introspect(&issued.token).await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn slow_auth_node_fails_closed() {
        let slow = Router::new().route(
            "/validate",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "too late"
            }),
        );
        let base = spawn_router(slow).await;
        let client = IntrospectionClient::new(&base, Duration::from_millis(200)).unwrap();

        let err = client.introspect("any-token").await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn empty_token_is_not_sent() {
        let base = closed_port_url().await;
        let client = IntrospectionClient::new(&base, Duration::from_millis(200)).unwrap();
        assert_eq!(client.introspect("").await.unwrap_err(), AuthError::MissingToken);
    }
}
