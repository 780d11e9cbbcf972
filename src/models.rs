// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies exchanged between clients and nodes, and
//! between nodes themselves. All types derive `Serialize`, `Deserialize`, and
//! `ToSchema` for JSON handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Tokens**: login and validation payloads of the auth node
//! - **Courses**: catalog entries and enrollment requests of the course node
//! - **Grades**: grade records of the grade node

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::auth::Role;

// =============================================================================
// Token Models
// =============================================================================

/// Credentials presented to obtain a token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    /// Signed token, valid for one hour.
    pub token: String,
    /// Role embedded in the token.
    pub role: Role,
}

/// Successful introspection answer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ValidateResponse {
    /// Always `"valid"`.
    pub status: String,
    pub username: String,
    pub role: Role,
}

impl ValidateResponse {
    pub const VALID: &'static str = "valid";
}

// =============================================================================
// Course Models
// =============================================================================

/// A course in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Course {
    /// Unique course code, e.g. `STDISCM`.
    pub id: String,
    pub title: String,
    pub credits: u32,
    /// Seats still available.
    pub open_slots: u32,
}

impl Course {
    pub fn new(id: impl Into<String>, title: impl Into<String>, credits: u32, open_slots: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            credits,
            open_slots,
        }
    }
}

/// A course as seen by one student.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CourseListing {
    pub id: String,
    pub title: String,
    pub credits: u32,
    pub open_slots: u32,
    /// Whether the requesting student holds a seat in this course.
    pub is_enrolled: bool,
}

impl CourseListing {
    pub fn from_course(course: &Course, is_enrolled: bool) -> Self {
        Self {
            id: course.id.clone(),
            title: course.title.clone(),
            credits: course.credits,
            open_slots: course.open_slots,
            is_enrolled,
        }
    }
}

/// Query for personalizing the course listing.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct CourseQuery {
    /// Student whose enrollments set `is_enrolled`.
    pub student_id: Option<String>,
}

/// Request to take a seat in a course.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EnrollRequest {
    pub course_id: String,
    pub student_id: String,
}

/// Enrollment request sent through the portal; the student is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PortalEnrollRequest {
    pub course_id: String,
}

// =============================================================================
// Grade Models
// =============================================================================

/// A recorded grade. Records are append-only.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct GradeRecord {
    pub student_id: String,
    pub course_id: String,
    pub grade: String,
}

impl GradeRecord {
    pub fn new(
        student_id: impl Into<String>,
        course_id: impl Into<String>,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            course_id: course_id.into(),
            grade: grade.into(),
        }
    }
}

/// Query selecting whose grades to list.
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct GradeQuery {
    pub student_id: String,
}

// =============================================================================
// Generic Responses
// =============================================================================

/// Simple `{ "status": ... }` acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn enrolled() -> Self {
        Self::new("enrolled")
    }

    pub fn grade_recorded() -> Self {
        Self::new("grade recorded")
    }
}
