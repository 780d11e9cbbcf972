// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory state of the resource nodes.
//!
//! Nothing here survives a restart. Each store is a cheap-to-clone handle
//! around its own lock and exposes only whole operations.

pub mod gradebook;
pub mod ledger;

pub use gradebook::GradeBook;
pub use ledger::{default_catalog, Enrollment, EnrollmentLedger, LedgerError};
