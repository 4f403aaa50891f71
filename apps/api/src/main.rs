//! Classroom API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod dto;
mod error;
mod extract;
mod gates;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use classroom_application::{
    ClassroomService, PermissionService, TaskService, TokenService, UserService,
};
use classroom_core::AppError;
use classroom_infrastructure::{
    Argon2PasswordHasher, PostgresClassroomRepository, PostgresPermissionRepository,
    PostgresTaskRepository, PostgresTokenRepository, PostgresUserRepository,
};
use sqlx::postgres::PgPoolOptions;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::api_config::{ApiConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;
    info!(
        max_connections = config.db_max_connections,
        "database connection pool established"
    );

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let token_service = TokenService::new(Arc::new(PostgresTokenRepository::new(pool.clone())));
    let permission_service =
        PermissionService::new(Arc::new(PostgresPermissionRepository::new(pool.clone())));
    let user_service = UserService::new(
        Arc::new(PostgresUserRepository::new(pool.clone())),
        Arc::new(Argon2PasswordHasher::new()),
        token_service.clone(),
        permission_service.clone(),
        config.token_lifetimes,
    );

    let app_state = AppState {
        classroom_service: ClassroomService::new(Arc::new(PostgresClassroomRepository::new(
            pool.clone(),
        ))),
        task_service: TaskService::new(Arc::new(PostgresTaskRepository::new(pool.clone()))),
        user_service,
        token_service,
        permission_service,
    };

    let app = api_router::build_router(app_state);

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "classroom-api listening");

    let (stop_sender, stop_receiver) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                stop_receiver.await.ok();
            })
            .await
    });

    tokio::select! {
        joined = &mut server => {
            pool.close().await;
            return server_outcome(joined);
        }
        () = shutdown_signal() => {}
    }

    stop_sender.send(()).ok();
    info!(
        grace_seconds = config.shutdown_grace.as_secs(),
        "draining in-flight requests"
    );

    let outcome = match tokio::time::timeout(config.shutdown_grace, &mut server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!("shutdown grace period elapsed, aborting remaining requests");
            server.abort();
            Ok(())
        }
    };

    pool.close().await;
    info!("shutdown complete");
    outcome
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    match joined {
        Ok(Ok(())) => Ok(()),
        Ok(Err(error)) => Err(AppError::Internal(format!("api server error: {error}"))),
        Err(error) => Err(AppError::Internal(format!("api server task failed: {error}"))),
    }
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                warn!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c, shutting down"),
        () = terminate => info!("received SIGTERM, shutting down"),
    }
}
