// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Course catalog and enrollment ledger.
//!
//! The catalog and the set of enrollment facts sit behind one lock. Every
//! operation takes that lock exactly once, so the duplicate/existence/capacity
//! checks of [`EnrollmentLedger::enroll`] and the seat decrement that follows
//! them can never be observed apart, and two students racing for the last
//! seat cannot both win.
//!
//! Invariant, per course: `open_slots + enrolled students == initial slots`.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::{Course, CourseListing};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Student already enrolled")]
    AlreadyEnrolled,

    #[error("Course full")]
    CourseFull,

    #[error("Course not found")]
    CourseNotFound,
}

/// Outcome of a successful enrollment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrollment {
    pub course_id: String,
    pub student_id: String,
    /// Seats left in the course after this enrollment.
    pub remaining_slots: u32,
}

#[derive(Debug, Default)]
struct LedgerState {
    /// Catalog order is preserved in listings.
    courses: Vec<Course>,
    /// `(course_id, student_id)` pairs holding a seat.
    enrollments: HashSet<(String, String)>,
}

impl LedgerState {
    fn is_enrolled(&self, course_id: &str, student_id: &str) -> bool {
        self.enrollments
            .contains(&(course_id.to_string(), student_id.to_string()))
    }
}

/// Shared handle to the ledger. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct EnrollmentLedger {
    inner: Arc<RwLock<LedgerState>>,
}

impl EnrollmentLedger {
    /// Ledger over `courses`. Later duplicates of a course id are ignored.
    pub fn with_catalog(courses: impl IntoIterator<Item = Course>) -> Self {
        let mut seen = HashSet::new();
        let courses = courses
            .into_iter()
            .filter(|course| seen.insert(course.id.clone()))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(LedgerState {
                courses,
                enrollments: HashSet::new(),
            })),
        }
    }

    /// Ledger over the default catalog.
    pub fn seeded() -> Self {
        Self::with_catalog(default_catalog())
    }

    /// Snapshot of the catalog, personalized for `for_student` when given.
    pub async fn list_courses(&self, for_student: Option<&str>) -> Vec<CourseListing> {
        let state = self.inner.read().await;
        state
            .courses
            .iter()
            .map(|course| {
                let is_enrolled = for_student
                    .filter(|student| !student.is_empty())
                    .is_some_and(|student| state.is_enrolled(&course.id, student));
                CourseListing::from_course(course, is_enrolled)
            })
            .collect()
    }

    /// Take one seat in `course_id` for `student_id`.
    pub async fn enroll(&self, course_id: &str, student_id: &str) -> Result<Enrollment, LedgerError> {
        let mut state = self.inner.write().await;

        if state.is_enrolled(course_id, student_id) {
            return Err(LedgerError::AlreadyEnrolled);
        }

        let course = state
            .courses
            .iter_mut()
            .find(|course| course.id == course_id)
            .ok_or(LedgerError::CourseNotFound)?;

        if course.open_slots == 0 {
            return Err(LedgerError::CourseFull);
        }
        course.open_slots -= 1;
        let remaining_slots = course.open_slots;

        state
            .enrollments
            .insert((course_id.to_string(), student_id.to_string()));

        Ok(Enrollment {
            course_id: course_id.to_string(),
            student_id: student_id.to_string(),
            remaining_slots,
        })
    }

    pub async fn course(&self, course_id: &str) -> Option<Course> {
        let state = self.inner.read().await;
        state.courses.iter().find(|c| c.id == course_id).cloned()
    }

    /// Number of students holding a seat in `course_id`.
    #[cfg(test)]
    pub async fn enrolled_count(&self, course_id: &str) -> usize {
        let state = self.inner.read().await;
        state
            .enrollments
            .iter()
            .filter(|(course, _)| course == course_id)
            .count()
    }
}

/// Courses every course node starts with.
pub fn default_catalog() -> Vec<Course> {
    vec![
        Course::new("CCPROG2", "Programming with Structured Data Types", 3, 20),
        Course::new("STDISCM", "Distributed Computing", 4, 15),
        Course::new(
            "CSMATH1",
            "Differential Calculus for Computer Science Students",
            3,
            30,
        ),
    ]
}
