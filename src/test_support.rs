// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Helpers for tests that need real nodes listening on loopback.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use url::Url;

use crate::api;
use crate::auth::{CredentialStore, IntrospectionClient, SigningKey, TokenService};
use crate::state::{AuthNodeState, CourseNodeState, GradeNodeState};
use crate::store::{EnrollmentLedger, GradeBook};

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn_router(router: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A loopback URL nothing listens on.
pub async fn closed_port_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// A node whose `GET {path}` always answers `status`, counting every hit.
pub async fn spawn_counting_stub(path: &str, status: StatusCode) -> (Url, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let router = Router::new().route(
        path,
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                status
            }
        }),
    );
    (spawn_router(router).await, hits)
}

/// Auth, course and grade nodes running side by side.
pub struct Cluster {
    pub tokens: TokenService,
    pub ledger: EnrollmentLedger,
    pub grades: GradeBook,
    pub auth_url: Url,
    pub course_url: Url,
    pub grade_url: Url,
}

impl Cluster {
    pub async fn spawn() -> Self {
        let tokens = TokenService::new(
            CredentialStore::seeded(),
            &SigningKey::from_secret("cluster-test-signing-key-0123456789"),
        );
        let auth_url = spawn_router(api::auth::router(AuthNodeState::new(tokens.clone()))).await;

        let ledger = EnrollmentLedger::seeded();
        let course_url =
            spawn_router(api::courses::router(CourseNodeState::new(ledger.clone()))).await;

        let grades = GradeBook::seeded();
        let introspection = IntrospectionClient::new(&auth_url, Duration::from_secs(2)).unwrap();
        let grade_url = spawn_router(api::grades::router(GradeNodeState::new(
            grades.clone(),
            introspection,
        )))
        .await;

        Self {
            tokens,
            ledger,
            grades,
            auth_url,
            course_url,
            grade_url,
        }
    }

    pub fn token_for(&self, username: &str) -> String {
        self.tokens.issue(username, "pass123").unwrap().token
    }
}
