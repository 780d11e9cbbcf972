// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults and the [`Settings`] loaded from them
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NODE_ROLE` | Which node to run: `auth`, `course`, `grade`, `portal` | Required |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8081` auth, `8082` course, `8083` grade, `8080` portal |
//! | `APP_ENV` | `production` or `development` | `development` |
//! | `JWT_SECRET` | Token signing key (auth node only) | Required for production |
//! | `AUTH_SERVICE_URL` | Base URL of the auth node | `http://localhost:8081` |
//! | `COURSE_SERVICE_URL` | Base URL of the course node | `http://localhost:8082` |
//! | `GRADE_SERVICE_URL` | Base URL of the grade node | `http://localhost:8083` |
//! | `UPSTREAM_TIMEOUT_MS` | Timeout of each node-to-node call | `2000` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use url::Url;

use crate::auth::SigningKey;
use crate::upstream::DEFAULT_UPSTREAM_TIMEOUT;

pub const NODE_ROLE_ENV: &str = "NODE_ROLE";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const APP_ENV_ENV: &str = "APP_ENV";

/// Symmetric key used to sign and verify tokens.
///
/// There is no built-in fallback. In production a missing key stops the auth
/// node from starting; in development a random per-process key is generated.
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";

pub const AUTH_SERVICE_URL_ENV: &str = "AUTH_SERVICE_URL";
pub const COURSE_SERVICE_URL_ENV: &str = "COURSE_SERVICE_URL";
pub const GRADE_SERVICE_URL_ENV: &str = "GRADE_SERVICE_URL";
pub const UPSTREAM_TIMEOUT_MS_ENV: &str = "UPSTREAM_TIMEOUT_MS";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_AUTH_SERVICE_URL: &str = "http://localhost:8081";
pub const DEFAULT_COURSE_SERVICE_URL: &str = "http://localhost:8082";
pub const DEFAULT_GRADE_SERVICE_URL: &str = "http://localhost:8083";
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Minimum signing key length accepted in production, in bytes.
pub const MIN_PRODUCTION_KEY_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    MissingVar(&'static str),

    #[error("{name} has invalid value {value:?}: {reason}")]
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("JWT_SECRET must be set when APP_ENV=production")]
    MissingSigningKey,

    #[error("JWT_SECRET is {actual} bytes, production requires at least {minimum}")]
    WeakSigningKey { actual: usize, minimum: usize },

    #[error("failed to generate a development signing key")]
    KeyGeneration,
}

/// Which node this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Token issuer and verifier
    Auth,
    /// Course catalog and enrollment ledger
    Course,
    /// Grade records, guarded by introspection
    Grade,
    /// Aggregating gateway in front of the others
    Portal,
}

impl NodeRole {
    pub fn from_str(s: &str) -> Option<NodeRole> {
        match s.trim().to_lowercase().as_str() {
            "auth" => Some(NodeRole::Auth),
            "course" => Some(NodeRole::Course),
            "grade" => Some(NodeRole::Grade),
            "portal" => Some(NodeRole::Portal),
            _ => None,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            NodeRole::Portal => 8080,
            NodeRole::Auth => 8081,
            NodeRole::Course => 8082,
            NodeRole::Grade => 8083,
        }
    }
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeRole::Auth => write!(f, "auth"),
            NodeRole::Course => write!(f, "course"),
            NodeRole::Grade => write!(f, "grade"),
            NodeRole::Portal => write!(f, "portal"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuntimeMode {
    Development,
    Production,
}

impl RuntimeMode {
    fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        match value.map(|v| v.trim().to_lowercase()) {
            None => Ok(RuntimeMode::Development),
            Some(v) if v.is_empty() || v == "development" || v == "dev" => {
                Ok(RuntimeMode::Development)
            }
            Some(v) if v == "production" || v == "prod" => Ok(RuntimeMode::Production),
            Some(v) => Err(ConfigError::InvalidVar {
                name: APP_ENV_ENV,
                value: v,
                reason: "expected `production` or `development`".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        }
    }
}

/// Everything a node needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub role: NodeRole,
    pub host: String,
    pub port: u16,
    pub mode: RuntimeMode,
    /// Present on the auth node only.
    pub signing_key: Option<SigningKey>,
    pub auth_url: Url,
    pub course_url: Url,
    pub grade_url: Url,
    pub upstream_timeout: Duration,
    pub log_format: LogFormat,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load settings through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_role = lookup(NODE_ROLE_ENV).ok_or(ConfigError::MissingVar(NODE_ROLE_ENV))?;
        let role = NodeRole::from_str(&raw_role).ok_or_else(|| ConfigError::InvalidVar {
            name: NODE_ROLE_ENV,
            value: raw_role.clone(),
            reason: "expected one of auth, course, grade, portal".into(),
        })?;

        let mode = RuntimeMode::parse(lookup(APP_ENV_ENV).as_deref())?;

        let host = lookup(HOST_ENV)
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match lookup(PORT_ENV) {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidVar {
                name: PORT_ENV,
                value: raw.clone(),
                reason: "expected a port number".into(),
            })?,
            None => role.default_port(),
        };

        let upstream_timeout = match lookup(UPSTREAM_TIMEOUT_MS_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => Duration::from_millis(ms),
                _ => {
                    return Err(ConfigError::InvalidVar {
                        name: UPSTREAM_TIMEOUT_MS_ENV,
                        value: raw,
                        reason: "expected a positive number of milliseconds".into(),
                    })
                }
            },
            None => DEFAULT_UPSTREAM_TIMEOUT,
        };

        let signing_key = match role {
            NodeRole::Auth => Some(resolve_signing_key(mode, lookup(JWT_SECRET_ENV))?),
            _ => None,
        };

        Ok(Self {
            role,
            host,
            port,
            mode,
            signing_key,
            auth_url: url_var(&lookup, AUTH_SERVICE_URL_ENV, DEFAULT_AUTH_SERVICE_URL)?,
            course_url: url_var(&lookup, COURSE_SERVICE_URL_ENV, DEFAULT_COURSE_SERVICE_URL)?,
            grade_url: url_var(&lookup, GRADE_SERVICE_URL_ENV, DEFAULT_GRADE_SERVICE_URL)?,
            upstream_timeout,
            log_format: LogFormat::parse(lookup(LOG_FORMAT_ENV).as_deref()),
        })
    }
}

fn url_var<F>(lookup: &F, name: &'static str, default: &str) -> Result<Url, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string());
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidVar {
        name,
        value: raw.clone(),
        reason: e.to_string(),
    })
}

fn resolve_signing_key(mode: RuntimeMode, raw: Option<String>) -> Result<SigningKey, ConfigError> {
    let secret = raw.filter(|s| !s.is_empty());

    match (mode, secret) {
        (RuntimeMode::Production, None) => Err(ConfigError::MissingSigningKey),
        (RuntimeMode::Production, Some(secret)) if secret.len() < MIN_PRODUCTION_KEY_LEN => {
            Err(ConfigError::WeakSigningKey {
                actual: secret.len(),
                minimum: MIN_PRODUCTION_KEY_LEN,
            })
        }
        (RuntimeMode::Development, None) => {
            tracing::warn!(
                "JWT_SECRET not set; using a random development key. Tokens will not survive a restart."
            );
            SigningKey::generate().map_err(|_| ConfigError::KeyGeneration)
        }
        (RuntimeMode::Development, Some(secret)) if secret.len() < MIN_PRODUCTION_KEY_LEN => {
            tracing::warn!(
                length = secret.len(),
                "JWT_SECRET is shorter than the production minimum"
            );
            Ok(SigningKey::from_secret(secret))
        }
        (_, Some(secret)) => Ok(SigningKey::from_secret(secret)),
    }
}
