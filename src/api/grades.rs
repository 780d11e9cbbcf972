// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Grade node: grade listing and upload, guarded by introspection.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    auth::{authorize, Action, Introspected},
    error::{require_non_empty, ApiError},
    models::{GradeQuery, GradeRecord, StatusResponse},
    state::GradeNodeState,
};

/// List the grades of one student.
///
/// Students may only read their own grades; faculty may read anyone's.
#[utoipa::path(
    get,
    path = "/grades",
    params(GradeQuery),
    tag = "Grades",
    responses(
        (status = 200, body = [GradeRecord]),
        (status = 400, description = "Missing student_id"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn list_grades(
    State(state): State<GradeNodeState>,
    Introspected(identity): Introspected,
    query: Result<Query<GradeQuery>, QueryRejection>,
) -> Result<Json<Vec<GradeRecord>>, ApiError> {
    let Query(query) = query?;
    require_non_empty(&[("student_id", query.student_id.as_str())])?;
    authorize(
        &identity,
        Action::ViewGrades {
            student_id: &query.student_id,
        },
    )?;

    Ok(Json(state.grades.for_student(&query.student_id).await))
}

/// Append a grade record. Faculty only.
#[utoipa::path(
    post,
    path = "/upload-grade",
    request_body = GradeRecord,
    tag = "Grades",
    responses(
        (status = 201, body = StatusResponse),
        (status = 400, description = "Missing or empty field"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn upload_grade(
    State(state): State<GradeNodeState>,
    Introspected(identity): Introspected,
    payload: Result<Json<GradeRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<StatusResponse>), ApiError> {
    authorize(&identity, Action::UploadGrade)?;

    let Json(record) = payload?;
    require_non_empty(&[
        ("student_id", record.student_id.as_str()),
        ("course_id", record.course_id.as_str()),
        ("grade", record.grade.as_str()),
    ])?;

    tracing::info!(
        uploaded_by = %identity.username,
        student_id = %record.student_id,
        course_id = %record.course_id,
        "Grade recorded"
    );
    state.grades.record(record).await;

    Ok((StatusCode::CREATED, Json(StatusResponse::grade_recorded())))
}

pub fn router(state: GradeNodeState) -> Router {
    Router::new()
        .route("/grades", get(list_grades))
        .route("/upload-grade", post(upload_grade))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(list_grades, upload_grade),
    components(schemas(GradeRecord, StatusResponse)),
    tags((name = "Grades", description = "Grade records"))
)]
pub struct GradesApiDoc;
