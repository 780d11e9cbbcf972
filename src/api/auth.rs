// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth node: token issuance and introspection.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{
    auth::{Role, Verified},
    error::{require_non_empty, ApiError},
    models::{LoginRequest, LoginResponse, ValidateResponse},
    state::AuthNodeState,
};

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse),
        (status = 400, description = "Malformed request"),
        (status = 401, description = "Invalid username or password")
    )
)]
pub async fn login(
    State(state): State<AuthNodeState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    require_non_empty(&[
        ("username", request.username.as_str()),
        ("password", request.password.as_str()),
    ])?;

    let issued = state.tokens.issue(&request.username, &request.password)?;
    Ok(Json(LoginResponse {
        token: issued.token,
        role: issued.identity.role,
    }))
}

/// Tell a resource node who a token belongs to.
#[utoipa::path(
    get,
    path = "/validate",
    tag = "Auth",
    responses(
        (status = 200, body = ValidateResponse),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn validate(Verified(identity): Verified) -> Json<ValidateResponse> {
    tracing::debug!(username = %identity.username, "Token validated");
    Json(ValidateResponse {
        status: ValidateResponse::VALID.to_string(),
        username: identity.username,
        role: identity.role,
    })
}

pub fn router(state: AuthNodeState) -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/validate", get(validate))
        .with_state(state)
}

#[derive(OpenApi)]
#[openapi(
    paths(login, validate),
    components(schemas(LoginRequest, LoginResponse, ValidateResponse, Role)),
    tags((name = "Auth", description = "Token issuance and introspection"))
)]
pub struct AuthApiDoc;
