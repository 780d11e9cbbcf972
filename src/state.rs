// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Per-node application state.
//!
//! Each node role gets its own state type holding only what its handlers
//! need. The auth extractors reach their dependency through [`FromRef`].

use axum::extract::FromRef;

use crate::auth::{IntrospectionClient, TokenService};
use crate::gateway::Gateway;
use crate::store::{EnrollmentLedger, GradeBook};

#[derive(Clone, Debug)]
pub struct AuthNodeState {
    pub tokens: TokenService,
}

impl AuthNodeState {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }
}

impl FromRef<AuthNodeState> for TokenService {
    fn from_ref(state: &AuthNodeState) -> Self {
        state.tokens.clone()
    }
}

#[derive(Clone, Debug)]
pub struct CourseNodeState {
    pub ledger: EnrollmentLedger,
}

impl CourseNodeState {
    pub fn new(ledger: EnrollmentLedger) -> Self {
        Self { ledger }
    }
}

#[derive(Clone, Debug)]
pub struct GradeNodeState {
    pub grades: GradeBook,
    pub introspection: IntrospectionClient,
}

impl GradeNodeState {
    pub fn new(grades: GradeBook, introspection: IntrospectionClient) -> Self {
        Self {
            grades,
            introspection,
        }
    }
}

impl FromRef<GradeNodeState> for IntrospectionClient {
    fn from_ref(state: &GradeNodeState) -> Self {
        state.introspection.clone()
    }
}

#[derive(Clone, Debug)]
pub struct PortalState {
    pub gateway: Gateway,
}

impl PortalState {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}
