// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Token issuance, verification, introspection and role-based policy.
//!
//! ## Auth Flow
//!
//! 1. Client posts credentials to the auth node's `/login`
//! 2. Auth node checks the [`CredentialStore`] and returns a signed token
//! 3. Client sends `Authorization: Bearer <token>` to any resource node
//! 4. Resource node:
//!    - Introspects the token against the auth node's `/validate`
//!    - Applies [`policy::authorize`] to the returned identity
//!
//! ## Security
//!
//! - Tokens expire one hour after issuance
//! - The signing key never leaves the auth node
//! - Introspection fails closed when the auth node is unreachable
//! - Token failures are indistinguishable on the wire

pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod introspection;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Identity, TokenClaims};
pub use credentials::CredentialStore;
pub use error::AuthError;
pub use extractor::{Bearer, Introspected, Verified};
pub use introspection::IntrospectionClient;
pub use policy::{authorize, Action};
pub use roles::Role;
pub use token::{IssuedToken, SigningKey, TokenService};
