// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Aggregating Gateway
//!
//! Backs the portal node. A dashboard render validates the caller's session
//! through introspection and then fans out to the course node and, for
//! students only, the grade node.
//!
//! ## Degradation
//!
//! Each backend call is a single attempt with its own timeout. A failed call
//! turns only its own section into [`Section::Unavailable`]; the other section
//! and the response as a whole are unaffected. There is no breaker state:
//! every render tries every dependency afresh.
//!
//! The remaining operations relay a single request to one backend and pass
//! its status through, answering 503 when that backend cannot be reached.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::auth::{authorize, Action, AuthError, Identity, IntrospectionClient, Role};
use crate::models::{CourseListing, EnrollRequest, GradeRecord, LoginRequest};
use crate::upstream::{self, UpstreamError};

const AUTH: &str = "auth";
const COURSE: &str = "course";
const GRADE: &str = "grade";

/// One independently fetched part of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Section<T> {
    Available { data: T },
    Unavailable { reason: String },
}

impl<T> Section<T> {
    fn from_result(service: &'static str, result: Result<T, UpstreamError>) -> Self {
        match result {
            Ok(data) => Section::Available { data },
            Err(err) => {
                tracing::warn!(service, error = %err, "Rendering section as unavailable");
                Section::Unavailable {
                    reason: format!("{service} service unavailable"),
                }
            }
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Section::Available { .. })
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Available { data } => Some(data),
            Section::Unavailable { .. } => None,
        }
    }
}

/// Everything the portal shows a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardView {
    pub username: String,
    pub role: Role,
    pub courses: Section<Vec<CourseListing>>,
    /// Absent for faculty, who never trigger the grade call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grades: Option<Section<Vec<GradeRecord>>>,
}

/// A backend answer passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Relayed {
    pub status: StatusCode,
    pub body: serde_json::Value,
}

impl IntoResponse for Relayed {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[derive(Debug, Clone)]
pub struct Gateway {
    http: Client,
    introspection: IntrospectionClient,
    login_url: Url,
    courses_url: Url,
    enroll_url: Url,
    grades_url: Url,
    upload_url: Url,
    timeout: Duration,
}

impl Gateway {
    pub fn new(
        auth_url: &Url,
        course_url: &Url,
        grade_url: &Url,
        timeout: Duration,
    ) -> Result<Self, UpstreamError> {
        Ok(Self {
            http: upstream::build_client(timeout)?,
            introspection: IntrospectionClient::new(auth_url, timeout)?,
            login_url: upstream::endpoint(auth_url, "login")?,
            courses_url: upstream::endpoint(course_url, "courses")?,
            enroll_url: upstream::endpoint(course_url, "enroll")?,
            grades_url: upstream::endpoint(grade_url, "grades")?,
            upload_url: upstream::endpoint(grade_url, "upload-grade")?,
            timeout,
        })
    }

    pub fn introspection(&self) -> &IntrospectionClient {
        &self.introspection
    }

    /// Validate the session and compose the dashboard.
    ///
    /// Authentication and policy failures are terminal. Backend failures
    /// after that only degrade their own section.
    pub async fn dashboard(&self, token: &str) -> Result<DashboardView, AuthError> {
        let identity = self.introspection.introspect(token).await?;
        authorize(&identity, Action::ListCourses)?;
        Ok(self.compose(&identity, token).await)
    }

    async fn compose(&self, identity: &Identity, token: &str) -> DashboardView {
        let courses = self.fetch_courses(identity, token);
        let grades = async {
            match identity.role {
                Role::Student => Some(self.fetch_grades(identity, token).await),
                Role::Faculty => None,
            }
        };

        let (courses, grades) = tokio::join!(courses, grades);

        DashboardView {
            username: identity.username.clone(),
            role: identity.role,
            courses: Section::from_result(COURSE, courses),
            grades: grades.map(|result| Section::from_result(GRADE, result)),
        }
    }

    async fn fetch_courses(
        &self,
        identity: &Identity,
        token: &str,
    ) -> Result<Vec<CourseListing>, UpstreamError> {
        let mut url = self.courses_url.clone();
        url.query_pairs_mut()
            .append_pair("student_id", &identity.username);
        self.get_json(COURSE, url, token).await
    }

    async fn fetch_grades(
        &self,
        identity: &Identity,
        token: &str,
    ) -> Result<Vec<GradeRecord>, UpstreamError> {
        let mut url = self.grades_url.clone();
        url.query_pairs_mut()
            .append_pair("student_id", &identity.username);
        self.get_json(GRADE, url, token).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: Url,
        token: &str,
    ) -> Result<T, UpstreamError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(service, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status { service, status });
        }

        response
            .json()
            .await
            .map_err(|e| UpstreamError::from_body(service, e))
    }

    /// Exchange credentials for a token at the auth node.
    pub async fn login(&self, request: &LoginRequest) -> Result<Relayed, UpstreamError> {
        self.post_json(AUTH, self.login_url.clone(), None, request).await
    }

    /// Enroll the caller in `course_id`.
    pub async fn enroll(&self, identity: &Identity, course_id: &str) -> Result<Relayed, UpstreamError> {
        let request = EnrollRequest {
            course_id: course_id.to_string(),
            student_id: identity.username.clone(),
        };
        self.post_json(COURSE, self.enroll_url.clone(), None, &request)
            .await
    }

    /// Forward a grade upload with the caller's own token; the grade node
    /// performs introspection and the policy check itself.
    pub async fn upload_grade(&self, token: &str, record: &GradeRecord) -> Result<Relayed, UpstreamError> {
        self.post_json(GRADE, self.upload_url.clone(), Some(token), record)
            .await
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        service: &'static str,
        url: Url,
        token: Option<&str>,
        body: &B,
    ) -> Result<Relayed, UpstreamError> {
        let mut request = self.http.post(url).json(body).timeout(self.timeout);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| UpstreamError::from_transport(service, e))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::from_body(service, e))?;

        let body = serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::json!({ "error": String::from_utf8_lossy(&bytes).trim() })
        });

        tracing::debug!(service, %status, "Relayed request");
        Ok(Relayed { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{closed_port_url, spawn_counting_stub, spawn_router, Cluster};
    use axum::{routing::get, Router};
    use std::sync::atomic::Ordering;

    const TIMEOUT: Duration = Duration::from_millis(500);

    #[tokio::test]
    async fn student_dashboard_has_both_sections() {
        let c = Cluster::spawn().await;
        c.ledger.enroll("STDISCM", "student1").await.unwrap();
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &c.grade_url, TIMEOUT).unwrap();

        let view = gateway.dashboard(&c.token_for("student1")).await.unwrap();

        assert_eq!(view.username, "student1");
        assert_eq!(view.role, Role::Student);
        let courses = view.courses.data().unwrap();
        assert_eq!(courses.len(), 3);
        assert!(courses.iter().any(|c| c.id == "STDISCM" && c.is_enrolled));
        let grades = view.grades.unwrap();
        assert_eq!(grades.data().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn grades_down_keeps_courses() {
        let c = Cluster::spawn().await;
        let dead = closed_port_url().await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &dead, TIMEOUT).unwrap();

        let view = gateway.dashboard(&c.token_for("student2")).await.unwrap();

        assert!(view.courses.is_available());
        assert_eq!(
            view.grades,
            Some(Section::Unavailable {
                reason: "grade service unavailable".into()
            })
        );
    }

    #[tokio::test]
    async fn courses_down_keeps_grades() {
        let c = Cluster::spawn().await;
        let dead = closed_port_url().await;
        let gateway = Gateway::new(&c.auth_url, &dead, &c.grade_url, TIMEOUT).unwrap();

        let view = gateway.dashboard(&c.token_for("student1")).await.unwrap();

        assert!(!view.courses.is_available());
        assert!(view.grades.unwrap().is_available());
    }

    #[tokio::test]
    async fn slow_course_node_times_out_into_placeholder() {
        let c = Cluster::spawn().await;
        let slow = spawn_router(Router::new().route(
            "/courses",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Json(Vec::<CourseListing>::new())
            }),
        ))
        .await;
        let gateway = Gateway::new(&c.auth_url, &slow, &c.grade_url, Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let view = gateway.dashboard(&c.token_for("student1")).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(3));
        assert!(!view.courses.is_available());
        assert!(view.grades.unwrap().is_available());
    }

    #[tokio::test]
    async fn faculty_never_calls_grade_node() {
        let c = Cluster::spawn().await;
        let (grades, hits) = spawn_counting_stub("/grades", StatusCode::OK).await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &grades, TIMEOUT).unwrap();

        let view = gateway.dashboard(&c.token_for("faculty1")).await.unwrap();

        assert_eq!(view.role, Role::Faculty);
        assert!(view.courses.is_available());
        assert!(view.grades.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_grade_call_is_not_retried() {
        let c = Cluster::spawn().await;
        let (grades, hits) =
            spawn_counting_stub("/grades", StatusCode::INTERNAL_SERVER_ERROR).await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &grades, TIMEOUT).unwrap();

        let view = gateway.dashboard(&c.token_for("student1")).await.unwrap();

        assert!(!view.grades.unwrap().is_available());
        assert!(view.courses.is_available());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn every_render_calls_dependencies_afresh() {
        let c = Cluster::spawn().await;
        let (grades, hits) =
            spawn_counting_stub("/grades", StatusCode::SERVICE_UNAVAILABLE).await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &grades, TIMEOUT).unwrap();
        let token = c.token_for("student2");

        for render in 1..=3 {
            let view = gateway.dashboard(&token).await.unwrap();
            assert!(!view.grades.unwrap().is_available());
            assert_eq!(hits.load(Ordering::SeqCst), render);
        }

        let faculty = gateway.dashboard(&c.token_for("faculty1")).await.unwrap();
        assert!(faculty.grades.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn invalid_session_is_rejected_before_fan_out() {
        let c = Cluster::spawn().await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &c.grade_url, TIMEOUT).unwrap();

        let err = gateway.dashboard("forged.token.value").await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn auth_down_fails_closed() {
        let c = Cluster::spawn().await;
        let dead = closed_port_url().await;
        let gateway = Gateway::new(&dead, &c.course_url, &c.grade_url, TIMEOUT).unwrap();

        let err = gateway.dashboard(&c.token_for("student1")).await.unwrap_err();
        assert_eq!(err, AuthError::Unauthenticated);
    }

    #[tokio::test]
    async fn enroll_relay_passes_conflicts_through() {
        let c = Cluster::spawn().await;
        let gateway = Gateway::new(&c.auth_url, &c.course_url, &c.grade_url, TIMEOUT).unwrap();
        let student = Identity::new("student1", Role::Student);

        let first = gateway.enroll(&student, "CSMATH1").await.unwrap();
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(first.body["status"], "enrolled");

        let again = gateway.enroll(&student, "CSMATH1").await.unwrap();
        assert_eq!(again.status, StatusCode::CONFLICT);

        let missing = gateway.enroll(&student, "NOPE").await.unwrap();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn relay_to_dead_backend_is_unavailable() {
        let c = Cluster::spawn().await;
        let dead = closed_port_url().await;
        let gateway = Gateway::new(&c.auth_url, &dead, &c.grade_url, TIMEOUT).unwrap();

        let err = gateway
            .enroll(&Identity::new("student1", Role::Student), "CSMATH1")
            .await
            .unwrap_err();
        assert!(err.is_unavailable());
    }

    #[test]
    fn sections_serialize_with_status_tag() {
        let down: Section<Vec<GradeRecord>> = Section::Unavailable {
            reason: "grade service unavailable".into(),
        };
        let value = serde_json::to_value(&down).unwrap();
        assert_eq!(value["status"], "unavailable");
        assert_eq!(value["reason"], "grade service unavailable");

        let up = Section::Available { data: vec![1, 2] };
        let value = serde_json::to_value(&up).unwrap();
        assert_eq!(value["status"], "available");
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }
}
