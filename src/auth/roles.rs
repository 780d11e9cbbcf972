// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Roles resolved from the credential store.
///
/// ## Role Capabilities
///
/// - `Student` - Enrolls in courses, views own grades
/// - `Faculty` - Views any student's grades, uploads grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Enrolled student
    Student,
    /// Teaching staff
    Faculty,
}

impl Role {
    /// Parse role from string (case-insensitive).
    /// Used when reading the role claim back out of a token.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "student" => Some(Role::Student),
            "faculty" => Some(Role::Faculty),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }

    pub fn is_faculty(&self) -> bool {
        matches!(self, Role::Faculty)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
