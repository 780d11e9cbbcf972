// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Course node: catalog listing and enrollment.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    error::{require_non_empty, ApiError},
    models::{CourseListing, CourseQuery, EnrollRequest, StatusResponse},
    state::CourseNodeState,
};

/// List the catalog. A query that does not parse is served as an anonymous
/// listing rather than rejected.
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseQuery),
    tag = "Courses",
    responses((status = 200, body = [CourseListing]))
)]
pub async fn list_courses(
    State(state): State<CourseNodeState>,
    query: Result<Query<CourseQuery>, QueryRejection>,
) -> Json<Vec<CourseListing>> {
    let student_id = match query {
        Ok(Query(query)) => query.student_id,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Unreadable course query, listing anonymously");
            None
        }
    };
    Json(state.ledger.list_courses(student_id.as_deref()).await)
}

#[utoipa::path(
    post,
    path = "/enroll",
    request_body = EnrollRequest,
    tag = "Courses",
    responses(
        (status = 200, body = StatusResponse),
        (status = 400, description = "Missing course or student"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Already enrolled or course full")
    )
)]
pub async fn enroll(
    State(state): State<CourseNodeState>,
    payload: Result<Json<EnrollRequest>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(request) = payload?;
    require_non_empty(&[
        ("course_id", request.course_id.as_str()),
        ("student_id", request.student_id.as_str()),
    ])?;

    match state.ledger.enroll(&request.course_id, &request.student_id).await {
        Ok(enrollment) => {
            tracing::info!(
                course_id = %enrollment.course_id,
                student_id = %enrollment.student_id,
                remaining_slots = enrollment.remaining_slots,
                "Enrollment recorded"
            );
            Ok(Json(StatusResponse::enrolled()))
        }
        Err(err) => {
            tracing::info!(
                course_id = %request.course_id,
                student_id = %request.student_id,
                error = %err,
                "Enrollment refused"
            );
            Err(err.into())
        }
    }
}

pub fn router(state: CourseNodeState) -> Router {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/enroll", post(enroll))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(list_courses, enroll),
    components(schemas(CourseListing, EnrollRequest, StatusResponse)),
    tags((name = "Courses", description = "Course catalog and enrollment"))
)]
pub struct CoursesApiDoc;
