// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token claims and the identity recovered from them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by an issued token.
///
/// The role travels as a plain string so that an unknown role surfaces as a
/// malformed token instead of a generic decode failure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenClaims {
    /// Subject (username)
    pub sub: String,
    /// Role name
    pub role: String,
    /// Issued at (Unix seconds)
    pub iat: i64,
    /// Expiration (Unix seconds)
    pub exp: i64,
}

impl TokenClaims {
    pub fn new(identity: &Identity, issued_at: i64, expires_at: i64) -> Self {
        Self {
            sub: identity.username.clone(),
            role: identity.role.as_str().to_string(),
            iat: issued_at,
            exp: expires_at,
        }
    }
}

/// Authenticated identity.
///
/// This is the type handlers receive once a token has been verified, either
/// locally or through introspection. It lives for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identity {
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    /// Rebuild an identity from verified claims.
    pub fn from_claims(claims: &TokenClaims) -> Option<Self> {
        if claims.sub.is_empty() {
            return None;
        }
        let role = Role::from_str(&claims.role)?;
        Some(Self::new(claims.sub.clone(), role))
    }

    pub fn is_faculty(&self) -> bool {
        self.role.is_faculty()
    }
}
