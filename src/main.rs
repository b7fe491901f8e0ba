use anyhow::Context;
use tracing_subscriber::EnvFilter;

use student_api::{app, build_state, config, database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, SECURITY_JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.default_log_filter())),
        )
        .init();

    tracing::info!("Starting Student API in {:?} mode", config.environment);
    tracing::info!(
        "PUT policy: {:?}, auth policy: {:?}, name initial rule: {:?}",
        config.api.put_policy,
        config.security.auth_policy,
        config.validation.name_initial
    );

    let store = database::connect(&config.database)
        .await
        .context("failed to open student store")?;
    let state = build_state(config, store).context("failed to configure authentication")?;
    let router = app(state, config);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Student API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Student API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
