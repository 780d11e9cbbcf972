// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Append-only grade book.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::models::GradeRecord;

#[derive(Debug, Clone, Default)]
pub struct GradeBook {
    records: Arc<RwLock<Vec<GradeRecord>>>,
}

impl GradeBook {
    pub fn new(records: Vec<GradeRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Grade book with the records every grade node starts with.
    pub fn seeded() -> Self {
        Self::new(vec![
            GradeRecord::new("student1", "CCPROG1", "4.0"),
            GradeRecord::new("student1", "MTH101A", "3.5"),
            GradeRecord::new("student2", "CCPROG1", "2.0"),
        ])
    }

    /// Records of `student_id`, in recording order.
    pub async fn for_student(&self, student_id: &str) -> Vec<GradeRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.student_id == student_id)
            .cloned()
            .collect()
    }

    pub async fn record(&self, record: GradeRecord) {
        self.records.write().await.push(record);
    }

    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_student_in_order() {
        let book = GradeBook::seeded();
        let grades = book.for_student("student1").await;
        let courses: Vec<_> = grades.iter().map(|g| g.course_id.as_str()).collect();
        assert_eq!(courses, ["CCPROG1", "MTH101A"]);
        assert!(book.for_student("nobody").await.is_empty());
    }

    #[tokio::test]
    async fn records_are_appended() {
        let book = GradeBook::seeded();
        book.record(GradeRecord::new("student2", "STDISCM", "3.0")).await;
        assert_eq!(book.len().await, 4);
        let latest = book.for_student("student2").await;
        assert_eq!(latest.last().unwrap().course_id, "STDISCM");
    }
}
