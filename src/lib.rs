// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Campus Portal - distributed course enrollment nodes
//!
//! One binary serving one of four node roles: an auth node issuing and
//! introspecting tokens, a course node holding the enrollment ledger, a grade
//! node guarding grade records, and a portal node composing them for clients.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers per node role (Axum)
//! - `auth` - Tokens, introspection and role-based policy
//! - `gateway` - Dashboard composition with per-section degradation
//! - `store` - Enrollment ledger and grade book

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gateway;
pub mod models;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod upstream;

#[cfg(test)]
pub(crate) mod test_support;
