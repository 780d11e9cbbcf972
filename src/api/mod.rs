// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HTTP surface of every node role.
//!
//! Each role has its own router module. [`build_router`] picks one from the
//! settings and wraps it with the layers every node shares: health probes,
//! OpenAPI docs, request ids, tracing and CORS.

use axum::{http::Request, Router};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{CredentialStore, IntrospectionClient, TokenService},
    config::{ConfigError, NodeRole, Settings},
    error::StartupError,
    gateway::Gateway,
    state::{AuthNodeState, CourseNodeState, GradeNodeState, PortalState},
    store::{EnrollmentLedger, GradeBook},
};

pub mod auth;
pub mod courses;
pub mod grades;
pub mod health;
pub mod portal;

#[derive(OpenApi)]
#[openapi(
    paths(health::liveness, health::readiness),
    components(schemas(health::HealthResponse, health::ReadyResponse, health::HealthChecks)),
    tags((name = "Health", description = "Liveness and readiness probes"))
)]
struct HealthApiDoc;

/// Build the router for the node role in `settings`.
pub fn build_router(settings: &Settings) -> Result<Router, StartupError> {
    let role = settings.role;
    let app = match role {
        NodeRole::Auth => {
            let key = settings
                .signing_key
                .as_ref()
                .filter(|key| !key.is_empty())
                .ok_or(ConfigError::MissingSigningKey)?;
            tracing::info!(key_len = key.len(), "Token signing key loaded");
            let tokens = TokenService::new(CredentialStore::seeded(), key);
            finish(
                auth::router(AuthNodeState::new(tokens)),
                role,
                auth::AuthApiDoc::openapi(),
            )
        }
        NodeRole::Course => finish(
            courses::router(CourseNodeState::new(EnrollmentLedger::seeded())),
            role,
            courses::CoursesApiDoc::openapi(),
        ),
        NodeRole::Grade => {
            let introspection =
                IntrospectionClient::new(&settings.auth_url, settings.upstream_timeout)?;
            finish(
                grades::router(GradeNodeState::new(GradeBook::seeded(), introspection)),
                role,
                grades::GradesApiDoc::openapi(),
            )
        }
        NodeRole::Portal => {
            let gateway = Gateway::new(
                &settings.auth_url,
                &settings.course_url,
                &settings.grade_url,
                settings.upstream_timeout,
            )?;
            finish(
                portal::router(PortalState::new(gateway)),
                role,
                portal::PortalApiDoc::openapi(),
            )
        }
    };
    Ok(app)
}

/// Attach the routes and layers shared by all nodes.
pub fn finish(routes: Router, role: NodeRole, mut doc: utoipa::openapi::OpenApi) -> Router {
    doc.merge(HealthApiDoc::openapi());

    routes
        .merge(health::router(role))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", doc))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http().make_span_with(move |request: &Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "request",
                    node = %role,
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SigningKey;
    use crate::config::{LogFormat, RuntimeMode};
    use axum::{
        body::{to_bytes, Body},
        http::StatusCode,
    };
    use std::time::Duration;
    use tower::ServiceExt;
    use url::Url;

    fn settings(role: NodeRole) -> Settings {
        Settings {
            role,
            host: "127.0.0.1".into(),
            port: role.default_port(),
            mode: RuntimeMode::Development,
            signing_key: match role {
                NodeRole::Auth => Some(SigningKey::from_secret("router-test-key-0123456789abcdefgh")),
                _ => None,
            },
            auth_url: Url::parse("http://localhost:8081").unwrap(),
            course_url: Url::parse("http://localhost:8082").unwrap(),
            grade_url: Url::parse("http://localhost:8083").unwrap(),
            upstream_timeout: Duration::from_millis(500),
            log_format: LogFormat::Pretty,
        }
    }

    #[tokio::test]
    async fn every_role_serves_health_and_docs() {
        for role in [NodeRole::Auth, NodeRole::Course, NodeRole::Grade, NodeRole::Portal] {
            let app = build_router(&settings(role)).unwrap();

            let ready = app
                .clone()
                .oneshot(Request::get("/health/ready").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(ready.status(), StatusCode::OK);
            let bytes = to_bytes(ready.into_body(), usize::MAX).await.unwrap();
            let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(body["checks"]["node"], role.to_string());

            let doc = app
                .oneshot(Request::get("/api-doc/openapi.json").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(doc.status(), StatusCode::OK);
            let bytes = to_bytes(doc.into_body(), usize::MAX).await.unwrap();
            let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(doc["paths"]["/health/live"].is_object());
        }
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let app = build_router(&settings(NodeRole::Course)).unwrap();
        let response = app
            .oneshot(Request::get("/courses").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[test]
    fn auth_node_without_key_fails_to_build() {
        let mut settings = settings(NodeRole::Auth);
        settings.signing_key = None;
        assert!(matches!(
            build_router(&settings),
            Err(StartupError::Config(ConfigError::MissingSigningKey))
        ));
    }

    #[test]
    fn auth_node_with_empty_key_fails_to_build() {
        let mut settings = settings(NodeRole::Auth);
        settings.signing_key = Some(SigningKey::from_secret(""));
        assert!(matches!(
            build_router(&settings),
            Err(StartupError::Config(ConfigError::MissingSigningKey))
        ));
    }
}
