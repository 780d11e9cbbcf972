// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role-based access policy.
//!
//! A pure decision over the requester and the action, applied by resource
//! nodes after introspection has established who is asking.

use super::{AuthError, Identity};

/// Something a requester wants to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    /// Read the grades of `student_id`.
    ViewGrades { student_id: &'a str },
    /// Append a grade record.
    UploadGrade,
    /// Take a seat in a course. Capacity is the ledger's concern, not ours.
    Enroll,
    /// Read the catalog and its personalized enrollment flags.
    ListCourses,
}

/// Allow or deny `action` for `requester`.
pub fn authorize(requester: &Identity, action: Action<'_>) -> Result<(), AuthError> {
    let allowed = match action {
        Action::ViewGrades { student_id } => {
            requester.is_faculty() || requester.username == student_id
        }
        Action::UploadGrade => requester.is_faculty(),
        Action::Enroll | Action::ListCourses => true,
    };

    if allowed {
        Ok(())
    } else {
        tracing::info!(
            username = %requester.username,
            role = %requester.role,
            action = ?action,
            "Policy denied action"
        );
        Err(AuthError::Forbidden)
    }
}
