use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use clienthub::api::{self, AppState};
use clienthub::registry::Registries;
use clienthub::{config, db};

/// Client and project tracking API for freelancers
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Address to listen on, overrides BIND_ADDRESS
    #[arg(long)]
    bind: Option<String>,

    /// Keep all data in process memory instead of Postgres
    #[arg(long)]
    in_memory: bool,

    /// Do not apply the bundled schema migrations at startup
    #[arg(long)]
    skip_migrations: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::init()?;
    tracing::info!(environment = %config.environment, "starting {}", config.app_name);

    // The storage handle lives for the whole process and is shared by every registry
    let registries = if cli.in_memory {
        tracing::warn!("using in-memory storage, data is lost on exit");
        Registries::in_memory()
    } else {
        let db = db::init(&config, !cli.skip_migrations)
            .await
            .context("connecting to the database")?;
        tracing::info!(database = %config.database_name, "database connection established");
        db.registries()
    };

    let state = AppState::new(&config, registries)?;
    let app = api::router(state, &config.cors_origins);

    let bind = cli.bind.unwrap_or_else(|| config.bind_address.clone());
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;
    tracing::info!(address = %bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
