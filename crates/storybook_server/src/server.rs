//! Wiring and the serve loop.

use crate::{AppState, ProviderProxy, ServerConfig, build_router};
use std::sync::Arc;
use storybook_database::{
    InMemoryBookRepository, InMemorySettingsRepository, PostgresBookRepository,
    PostgresSettingsRepository, establish_pool, run_pool_migrations,
};
use storybook_error::{ConfigError, ConfigErrorKind, ServerError, ServerErrorKind, StorybookResult};
use storybook_models::HttpTransport;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Where books and settings live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// PostgreSQL at the configured URL, migrated on startup
    Postgres,
    /// Process memory, lost on exit
    InMemory,
}

/// Build handler state for `config`.
///
/// # Errors
///
/// Fails when PostgreSQL is selected but no URL is configured, the pool
/// cannot connect, or migrations fail.
#[instrument(skip(config))]
pub async fn build_state(config: &ServerConfig, backend: StorageBackend) -> StorybookResult<AppState> {
    let proxy = ProviderProxy::from_config(Arc::new(HttpTransport::new()), config);
    if config.keys().gemini.is_none() {
        warn!("No server Gemini key; callers must supply their own");
    }

    match backend {
        StorageBackend::InMemory => {
            info!("Using in-memory storage");
            Ok(AppState::new(
                Arc::new(InMemoryBookRepository::new()),
                Arc::new(InMemorySettingsRepository::new()),
                proxy,
            ))
        }
        StorageBackend::Postgres => {
            let url = config
                .database_url()
                .clone()
                .ok_or_else(|| ConfigError::new(ConfigErrorKind::Missing("DATABASE_URL".to_string())))?;
            let pool_size = *config.pool_size();
            let pool = tokio::task::spawn_blocking(move || {
                let pool = establish_pool(&url, pool_size)?;
                run_pool_migrations(&pool)?;
                Ok::<_, storybook_error::DatabaseError>(pool)
            })
            .await
            .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))??;
            info!(pool_size, "Connected to PostgreSQL");
            Ok(AppState::new(
                Arc::new(PostgresBookRepository::new(pool.clone())),
                Arc::new(PostgresSettingsRepository::new(pool)),
                proxy,
            ))
        }
    }
}

/// Serve the API until Ctrl-C.
///
/// # Errors
///
/// Fails when the address cannot be bound or the server loop errors.
#[instrument(skip(config, state), fields(bind_address = %config.bind_address()))]
pub async fn serve(config: &ServerConfig, state: AppState) -> StorybookResult<()> {
    let router = build_router(state, *config.body_limit());
    let listener = TcpListener::bind(config.bind_address())
        .await
        .map_err(|e| {
            ServerError::new(ServerErrorKind::Bind(format!(
                "{}: {}",
                config.bind_address(),
                e
            )))
        })?;

    info!("Storybook server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::new(ServerErrorKind::Serve(e.to_string())))?;
    info!("Storybook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
