// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Portal node: the client-facing gateway.
//!
//! Every route here delegates to [`Gateway`](crate::gateway::Gateway). The
//! dashboard degrades per section; the relays pass backend answers through.

use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, State},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    auth::{authorize, extractor::bearer_token, Action, AuthError, Bearer, Identity},
    error::{require_non_empty, ApiError},
    gateway::Relayed,
    models::{GradeRecord, LoginRequest, LoginResponse, PortalEnrollRequest, StatusResponse},
    state::PortalState,
};

/// A session confirmed by the auth node for this request.
pub struct PortalSession {
    pub identity: Identity,
}

impl FromRequestParts<PortalState> for PortalSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &PortalState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)?;
        let identity = state.gateway.introspection().introspect(token).await?;
        Ok(Self { identity })
    }
}

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Portal",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid username or password"),
        (status = 503, description = "Auth node unavailable")
    )
)]
pub async fn login(
    State(state): State<PortalState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Relayed, ApiError> {
    let Json(request) = payload?;
    Ok(state.gateway.login(&request).await?)
}

/// Render the dashboard, or send the caller back to `/login`.
#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "Portal",
    responses(
        (status = 200, description = "Dashboard with per-section availability"),
        (status = 303, description = "Session missing or invalid, redirect to /login")
    )
)]
pub async fn dashboard(
    State(state): State<PortalState>,
    bearer: Result<Bearer, AuthError>,
) -> Response {
    let view = match bearer {
        Ok(Bearer(token)) => state.gateway.dashboard(&token).await,
        Err(err) => Err(err),
    };

    match view {
        Ok(view) => Json(view).into_response(),
        Err(err) => {
            tracing::debug!(reason = err.reason(), "Redirecting to login");
            Redirect::to("/login").into_response()
        }
    }
}

#[utoipa::path(
    post,
    path = "/enroll",
    request_body = PortalEnrollRequest,
    tag = "Portal",
    responses(
        (status = 200, body = StatusResponse),
        (status = 401, description = "Authentication required"),
        (status = 404, description = "Course not found"),
        (status = 409, description = "Already enrolled or course full"),
        (status = 503, description = "Course node unavailable")
    )
)]
pub async fn enroll(
    State(state): State<PortalState>,
    session: PortalSession,
    payload: Result<Json<PortalEnrollRequest>, JsonRejection>,
) -> Result<Relayed, ApiError> {
    authorize(&session.identity, Action::Enroll)?;

    let Json(request) = payload?;
    require_non_empty(&[("course_id", request.course_id.as_str())])?;
    Ok(state.gateway.enroll(&session.identity, &request.course_id).await?)
}

/// Forward a grade upload; the grade node decides whether it is allowed.
#[utoipa::path(
    post,
    path = "/upload-grade",
    request_body = GradeRecord,
    tag = "Portal",
    responses(
        (status = 201, body = StatusResponse),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Insufficient permissions"),
        (status = 503, description = "Grade node unavailable")
    )
)]
pub async fn upload_grade(
    State(state): State<PortalState>,
    Bearer(token): Bearer,
    payload: Result<Json<GradeRecord>, JsonRejection>,
) -> Result<Relayed, ApiError> {
    let Json(record) = payload?;
    Ok(state.gateway.upload_grade(&token, &record).await?)
}

async fn index() -> Redirect {
    Redirect::to("/login")
}

pub fn router(state: PortalState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/login", post(login))
        .route("/dashboard", get(dashboard))
        .route("/enroll", post(enroll))
        .route("/upload-grade", post(upload_grade))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(login, dashboard, enroll, upload_grade),
    components(schemas(LoginRequest, LoginResponse, PortalEnrollRequest, GradeRecord, StatusResponse)),
    tags((name = "Portal", description = "Client-facing gateway"))
)]
pub struct PortalApiDoc;
