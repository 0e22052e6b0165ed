//! Campus Auth server
//!
//! Serves the authentication API over HTTP. Uses PostgreSQL when
//! `DATABASE_URL` is set and an in-memory store otherwise.

use campus_auth::{
    cors_layer, create_routes, AuthConfig, AuthError, AuthService, MemoryUserRepository,
    PgUserRepository, ServerConfig, UserRepository,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("campus_auth=info,tower_http=info")),
        )
        .init();

    tracing::info!("Starting Campus Auth");

    let config = AuthConfig::from_env()?;
    config.validate()?;
    let server = ServerConfig::from_env()?;

    let users: Arc<dyn UserRepository> = match &server.database_url {
        Some(url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(config.repository_timeout)
                .connect(url)
                .await?;
            let repo = PgUserRepository::new(pool);
            repo.migrate().await.map_err(AuthError::from)?;
            Arc::new(repo)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, users are kept in memory and lost on restart");
            Arc::new(MemoryUserRepository::new())
        }
    };

    let auth = Arc::new(AuthService::new(users, config)?);

    let mut app = create_routes(auth);
    if let Some(origin) = &server.client_origin {
        app = app.layer(cors_layer(origin)?);
    }

    tracing::info!("Listening on {}", server.bind_addr);
    let listener = tokio::net::TcpListener::bind(server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Campus Auth stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
