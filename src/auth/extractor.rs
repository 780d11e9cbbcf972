// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated identities.
//!
//! Two ways of establishing who is calling:
//!
//! - [`Verified`] checks the token locally with the node's [`TokenService`].
//!   Only the auth node can do this because only it holds the signing key.
//! - [`Introspected`] forwards the token to the auth node through the
//!   [`IntrospectionClient`]. Resource nodes and the portal use this.
//!
//! ```rust,ignore
//! async fn list_grades(Introspected(identity): Introspected) -> impl IntoResponse {
//!     // identity is valid for this request only
//! }
//! ```

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use super::{AuthError, Identity, IntrospectionClient, TokenService};

/// Pull the bearer token out of the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingToken)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}

/// The raw bearer token, unverified. Used where the token is only relayed.
pub struct Bearer(pub String);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        bearer_token(&parts.headers).map(|token| Bearer(token.to_string()))
    }
}

/// Identity verified against the local signing key.
pub struct Verified(pub Identity);

impl<S> FromRequestParts<S> for Verified
where
    TokenService: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let tokens = TokenService::from_ref(state);
        Ok(Verified(tokens.verify(token)?))
    }
}

/// Identity confirmed by the auth node for this request.
pub struct Introspected(pub Identity);

impl<S> FromRequestParts<S> for Introspected
where
    IntrospectionClient: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let client = IntrospectionClient::from_ref(state);
        Ok(Introspected(client.introspect(token).await?))
    }
}
