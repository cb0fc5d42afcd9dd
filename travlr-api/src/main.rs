use std::net::SocketAddr;

use anyhow::Context;
use travlr_api::{app, AppState, AuthConfig};
use travlr_core::SessionKeys;
use travlr_store::{app_config::Config, Repositories};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "travlr_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting Travlr API on port {}", config.server.port);

    // A missing secret stops startup here rather than failing per request.
    let keys = SessionKeys::new(config.auth.jwt_secret.expose()).context("Invalid auth configuration")?;

    let repos = Repositories::connect(&config.database)
        .await
        .context("Failed to connect to database")?;

    let app_state = AppState::new(
        repos,
        keys,
        AuthConfig {
            secure_cookies: config.auth.secure_cookies,
            bcrypt_cost: config.auth.bcrypt_cost,
        },
    );

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        // Without a signal handler, keep serving until the process is killed.
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
