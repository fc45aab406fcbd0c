//! Request-level tests through the real router: session bridging, login
//! redirects, logout, and the published provider metadata.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Router};
use tempfile::TempDir;
use tower::ServiceExt;

use webid_op::api;
use webid_op::api::flow::{IssuanceFlow, UnmountedFlow};
use webid_op::error::AppError;
use webid_op::services::discovery::HttpDiscovery;
use webid_op::services::host::{AuthorizeRequest, Host, HostOptions, SessionCtx, Subject};
use webid_op::services::provider::Bootstrapper;
use webid_op::services::store::FsStore;
use webid_op::services::trust::TrustVerifier;
use webid_op::state::AppState;

const ISSUER: &str = "https://op.example";
const POST_LOGOUT: &str = "https://op.example/goodbye";

/// Issuance stand-in that records the subject it was handed.
#[derive(Clone, Default)]
struct RecordingFlow {
    seen: Arc<Mutex<Option<Subject>>>,
}

#[async_trait]
impl IssuanceFlow for RecordingFlow {
    async fn authorize(&self, request: AuthorizeRequest) -> Result<Response, AppError> {
        *self.seen.lock().unwrap() = Some(request.subject().clone());
        Ok(StatusCode::OK.into_response())
    }
}

async fn app_state(flow: Arc<dyn IssuanceFlow>) -> (TempDir, AppState) {
    let dir = tempfile::tempdir().unwrap();

    let provider = Bootstrapper::new(
        FsStore::new(dir.path()),
        ISSUER.to_string(),
        format!("{ISSUER}/callback"),
        POST_LOGOUT.to_string(),
    )
    .bootstrap()
    .await
    .unwrap();

    let verifier = TrustVerifier::new(
        ISSUER.to_string(),
        HttpDiscovery::new(Duration::from_secs(1)).unwrap(),
    );

    let state = AppState::new(
        Arc::new(Host::new(POST_LOGOUT.to_string(), HostOptions::default())),
        Arc::new(verifier),
        Arc::new(provider),
        flow,
    );

    (dir, state)
}

fn router(state: AppState, session: Option<SessionCtx>) -> Router {
    let router = api::routes().with_state(state);
    match session {
        Some(session) => router.layer(Extension(session)),
        None => router,
    }
}

#[tokio::test]
async fn health_answers_ok() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;

    let response = router(state, None)
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn anonymous_authorize_redirects_to_login_with_query() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;

    let response = router(state, None)
        .oneshot(
            Request::get("/authorize?response_type=code&client_id=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?response_type=code&client_id=abc"
    );
}

#[tokio::test]
async fn identified_authorize_hands_the_subject_to_the_flow() {
    let flow = RecordingFlow::default();
    let (_dir, state) = app_state(Arc::new(flow.clone())).await;
    let session = SessionCtx::identified("https://alice.example/#me");

    let response = router(state, Some(session))
        .oneshot(
            Request::get("/authorize?client_id=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let seen = flow.seen.lock().unwrap().clone().unwrap();
    match seen {
        Subject::WebId(claims) => assert_eq!(claims.web_id, "https://alice.example/#me"),
        other => panic!("expected a concrete subject, got {other:?}"),
    }
}

#[tokio::test]
async fn identified_authorize_without_engine_answers_501() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;
    let session = SessionCtx::identified("https://alice.example/#me");

    let response = router(state, Some(session))
        .oneshot(Request::get("/authorize").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn logout_redirects_to_the_post_logout_target() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;
    let session = SessionCtx::identified("https://alice.example/#me");

    let response = router(state, Some(session))
        .oneshot(Request::get("/logout").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], POST_LOGOUT);
}

#[tokio::test]
async fn discovery_document_names_the_issuer() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;

    let response = router(state, None)
        .oneshot(
            Request::get("/.well-known/openid-configuration")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(doc["issuer"], ISSUER);
    assert_eq!(doc["jwks_uri"], format!("{ISSUER}/jwks"));
}

#[tokio::test]
async fn jwks_publishes_only_public_material() {
    let (_dir, state) = app_state(Arc::new(UnmountedFlow)).await;

    let response = router(state, None)
        .oneshot(Request::get("/jwks").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    let keys = doc["keys"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["kty"], "OKP");
    assert!(keys[0].get("d").is_none());
}
