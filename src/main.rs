use google_login_service::{
    build_router,
    config::AppConfig,
    db,
    error::AppError,
    observability::init_tracing,
    services::{GoogleLoginService, GoogleProvider, JwtService, PgDirectory},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = AppConfig::from_env()?;

    init_tracing(&config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting Google login service"
    );

    let pool = db::connect(&config.database).await?;
    db::run_migrations(&pool).await?;

    let directory = Arc::new(PgDirectory::new(pool));
    let provider = Arc::new(GoogleProvider::new(&config.google)?);
    let jwt = JwtService::new(&config.jwt)?;
    tracing::info!("JWT service initialized");

    let login = GoogleLoginService::new(provider, directory, jwt, config.frontend.clone());

    let state = AppState {
        config: config.clone(),
        login,
    };
    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
