//! Test helpers: literal configuration, app construction against an
//! in-memory directory, and a stub Google server on an ephemeral port.

#![allow(dead_code)]

use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use google_login_service::{
    build_router,
    config::{
        AppConfig, DatabaseConfig, Environment, FrontendConfig, GoogleOAuthConfig, JwtConfig,
        SecurityConfig,
    },
    services::{GoogleLoginService, GoogleProvider, InMemoryDirectory, JwtService},
    AppState,
};

pub const TEST_JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";
pub const TEST_FRONTEND_URL: &str = "http://localhost:3000";

pub fn test_config(provider_base: &str) -> AppConfig {
    AppConfig {
        environment: Environment::Dev,
        service_name: "google-login-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        port: 8080,
        frontend: FrontendConfig {
            base_url: TEST_FRONTEND_URL.to_string(),
            provider_callback_path: "google".to_string(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/unused-in-tests".to_string(),
            max_connections: 5,
            min_connections: 1,
        },
        google: GoogleOAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            token_endpoint: format!("{}/token", provider_base),
            userinfo_endpoint: format!("{}/userinfo", provider_base),
            request_timeout_seconds: 5,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        security: SecurityConfig {
            allowed_origins: vec![TEST_FRONTEND_URL.to_string()],
        },
    }
}

pub fn test_jwt_service() -> JwtService {
    JwtService::new(&JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_minutes: 15,
        refresh_token_expiry_days: 7,
    })
    .expect("Failed to create JWT service")
}

/// Build the application router wired to the given directory and a stub
/// provider at `provider_base`.
pub async fn build_test_app(directory: Arc<InMemoryDirectory>, provider_base: &str) -> Router {
    let config = test_config(provider_base);
    let provider =
        Arc::new(GoogleProvider::new(&config.google).expect("Failed to create provider client"));
    let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
    let login = GoogleLoginService::new(provider, directory, jwt, config.frontend.clone());

    let state = AppState { config, login };
    build_router(state).await.expect("Failed to build router")
}

/// Serve canned token and userinfo responses; returns the base URL.
pub async fn spawn_provider_stub(
    token_status: StatusCode,
    token_body: serde_json::Value,
    userinfo_status: StatusCode,
    userinfo_body: serde_json::Value,
) -> String {
    let app = Router::new()
        .route(
            "/token",
            post(move || {
                let body = token_body.clone();
                async move { (token_status, Json(body)) }
            }),
        )
        .route(
            "/userinfo",
            get(move || {
                let body = userinfo_body.clone();
                async move { (userinfo_status, Json(body)) }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server died");
    });

    format!("http://{}", addr)
}
