// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and verification.
//!
//! Tokens are HS256 JWTs signed with a process-wide symmetric key. Validity
//! is a pure function of the token bytes, the key and the current time, so
//! the service keeps no per-session state and needs no synchronization.
//!
//! The same [`TokenService::verify`] backs the auth node's own checks and the
//! `/validate` endpoint other nodes introspect against.

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use ring::rand::{SecureRandom, SystemRandom};

use super::{AuthError, CredentialStore, Identity, TokenClaims};

/// Token lifetime from issuance (1 hour).
pub const TOKEN_LIFETIME_SECS: i64 = 60 * 60;

/// Length of a generated development key, in bytes.
const GENERATED_KEY_LEN: usize = 64;

/// Symmetric signing key material.
#[derive(Clone)]
pub struct SigningKey(Arc<[u8]>);

impl SigningKey {
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Self {
        Self(Arc::from(secret.as_ref()))
    }

    /// Random key that lives only as long as this process.
    pub fn generate() -> Result<Self, ring::error::Unspecified> {
        let mut bytes = [0u8; GENERATED_KEY_LEN];
        SystemRandom::new().fill(&mut bytes)?;
        Ok(Self::from_secret(bytes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

/// A freshly minted token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub identity: Identity,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Clone)]
pub struct TokenService {
    credentials: Arc<CredentialStore>,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(credentials: CredentialStore, key: &SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against `now < exp` below, without leeway.
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;

        Self {
            credentials: Arc::new(credentials),
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Verify credentials and mint a token valid for one hour.
    pub fn issue(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(username, password, Utc::now().timestamp())
    }

    pub fn issue_at(
        &self,
        username: &str,
        password: &str,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        let Some(role) = self.credentials.authenticate(username, password) else {
            tracing::warn!(username = %username, "Rejected login attempt");
            return Err(AuthError::InvalidCredentials);
        };

        let identity = Identity::new(username, role);
        let expires_at = now + TOKEN_LIFETIME_SECS;
        let claims = TokenClaims::new(&identity, now, expires_at);
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::SigningFailed(e.to_string()))?;

        tracing::info!(username = %identity.username, role = %identity.role, "Issued token");

        Ok(IssuedToken {
            token,
            identity,
            issued_at: now,
            expires_at,
        })
    }

    /// Check signature and expiry and recover the embedded identity.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    pub fn verify_at(&self, token: &str, now: i64) -> Result<Identity, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<TokenClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            },
        )?;

        if now >= data.claims.exp {
            return Err(AuthError::TokenExpired);
        }

        Identity::from_claims(&data.claims).ok_or(AuthError::MalformedToken)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

    const NOW: i64 = 1_700_000_000;

    fn service() -> TokenService {
        TokenService::new(
            CredentialStore::seeded(),
            &SigningKey::from_secret("test-signing-key-with-enough-bytes!!"),
        )
    }

    #[test]
    fn issues_for_every_seeded_account_with_stored_role() {
        let svc = service();
        let store = CredentialStore::seeded();
        for username in store.usernames() {
            let issued = svc.issue_at(username, "pass123", NOW).unwrap();
            assert_eq!(issued.identity.role, store.role_of(username).unwrap());
            assert_eq!(issued.expires_at, NOW + TOKEN_LIFETIME_SECS);

            let identity = svc.verify_at(&issued.token, NOW).unwrap();
            assert_eq!(identity, issued.identity);
        }
    }

    #[test]
    fn bad_credentials_fail_uniformly() {
        let svc = service();
        assert_eq!(
            svc.issue_at("student1", "wrong", NOW).unwrap_err(),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            svc.issue_at("nobody", "pass123", NOW).unwrap_err(),
            AuthError::InvalidCredentials
        );
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let svc = service();
        let issued = svc.issue_at("faculty1", "pass123", NOW).unwrap();

        assert!(svc.verify_at(&issued.token, issued.expires_at - 1).is_ok());
        assert_eq!(
            svc.verify_at(&issued.token, issued.expires_at).unwrap_err(),
            AuthError::TokenExpired
        );
        assert_eq!(
            svc.verify_at(&issued.token, issued.expires_at + 3600).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn different_key_fails_signature() {
        let issued = service().issue_at("student1", "pass123", NOW).unwrap();
        let other = TokenService::new(
            CredentialStore::seeded(),
            &SigningKey::from_secret("a-completely-different-signing-key"),
        );
        assert_eq!(
            other.verify_at(&issued.token, NOW).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn mutating_any_byte_breaks_verification() {
        let svc = service();
        let token = svc.issue_at("student2", "pass123", NOW).unwrap().token;

        for i in 0..token.len() {
            let mut bytes = token.clone().into_bytes();
            bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
            let tampered = String::from_utf8(bytes).unwrap();
            assert!(
                svc.verify_at(&tampered, NOW).is_err(),
                "tampered byte {i} still verified"
            );
        }
    }

    #[test]
    fn forged_role_claim_is_rejected() {
        let svc = service();
        let token = svc.issue_at("student1", "pass123", NOW).unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        let forged_claims = TokenClaims {
            sub: "student1".into(),
            role: "faculty".into(),
            iat: NOW,
            exp: NOW + TOKEN_LIFETIME_SECS,
        };
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{}.{}.{}", parts[0], payload, parts[2]);

        assert_eq!(
            svc.verify_at(&forged, NOW).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn empty_and_garbage_tokens() {
        let svc = service();
        assert_eq!(svc.verify_at("", NOW).unwrap_err(), AuthError::MissingToken);
        assert_eq!(svc.verify_at("   ", NOW).unwrap_err(), AuthError::MissingToken);
        assert_eq!(
            svc.verify_at("not-a-token", NOW).unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn unknown_role_in_signed_token_is_malformed() {
        let key = SigningKey::from_secret("test-signing-key-with-enough-bytes!!");
        let claims = TokenClaims {
            sub: "someone".into(),
            role: "janitor".into(),
            iat: NOW,
            exp: NOW + 60,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap();
        let svc = TokenService::new(CredentialStore::seeded(), &key);
        assert_eq!(svc.verify_at(&token, NOW).unwrap_err(), AuthError::MalformedToken);
    }

    #[test]
    fn generated_keys_are_random() {
        let a = SigningKey::generate().unwrap();
        let b = SigningKey::generate().unwrap();
        assert_eq!(a.len(), GENERATED_KEY_LEN);
        assert_ne!(a.as_bytes(), b.as_bytes());
        assert!(!format!("{a:?}").contains(&format!("{:?}", a.as_bytes())));
    }

    #[test]
    fn role_survives_round_trip() {
        let svc = service();
        let issued = svc.issue_at("faculty1", "pass123", NOW).unwrap();
        assert_eq!(svc.verify_at(&issued.token, NOW).unwrap().role, Role::Faculty);
    }
}
