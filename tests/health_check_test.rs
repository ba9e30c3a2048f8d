mod common;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::util::ServiceExt;

use common::{build_test_app, spawn_provider_stub};
use google_login_service::services::InMemoryDirectory;

#[tokio::test]
async fn health_check_reports_healthy() {
    let stub = spawn_provider_stub(
        StatusCode::OK,
        serde_json::json!({}),
        StatusCode::OK,
        serde_json::json!({}),
    )
    .await;
    let app = build_test_app(Arc::new(InMemoryDirectory::new()), &stub).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "google-login-service");
}
