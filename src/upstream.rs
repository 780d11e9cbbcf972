// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound HTTP plumbing shared by the introspection client and the gateway.
//!
//! Every call is a single attempt bounded by a per-request timeout. A timeout
//! is reported the same way as a refused connection; nothing here retries.

use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use url::Url;

/// Default per-call timeout for node-to-node requests.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service} did not answer within the timeout")]
    Timeout { service: &'static str },

    #[error("{service} is unreachable: {message}")]
    Unreachable {
        service: &'static str,
        message: String,
    },

    #[error("{service} answered with HTTP {status}")]
    Status {
        service: &'static str,
        status: StatusCode,
    },

    #[error("{service} sent an invalid response: {message}")]
    InvalidBody {
        service: &'static str,
        message: String,
    },

    #[error("invalid upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl UpstreamError {
    pub fn from_transport(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { service }
        } else {
            UpstreamError::Unreachable {
                service,
                message: err.to_string(),
            }
        }
    }

    pub fn from_body(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return UpstreamError::Timeout { service };
        }
        UpstreamError::InvalidBody {
            service,
            message: err.to_string(),
        }
    }

    /// Whether the dependency itself could not be used, as opposed to a
    /// configuration problem on this node.
    pub fn is_unavailable(&self) -> bool {
        !matches!(
            self,
            UpstreamError::InvalidUrl(_) | UpstreamError::Client(_)
        )
    }
}

/// HTTP client shared by all outbound calls of a node.
pub fn build_client(timeout: Duration) -> Result<Client, UpstreamError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| UpstreamError::Client(e.to_string()))
}

/// Resolve `path` below `base`, keeping any path prefix `base` already has.
pub fn endpoint(base: &Url, path: &str) -> Result<Url, UpstreamError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    Ok(base.join(path.trim_start_matches('/'))?)
}
