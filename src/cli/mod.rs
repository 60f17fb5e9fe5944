use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::app::{app, AppState};
use crate::config::{AppConfig, StoreBackend};
use crate::database::{DatabaseManager, MemoryStore, PgStore, Store};

#[derive(Parser)]
#[command(name = "todo-api")]
#[command(about = "To-do list API server and operator commands")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on, overrides PORT")]
        port: Option<u16>,

        #[arg(long, help = "Use the in-memory store instead of Postgres")]
        in_memory: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Enable (or disable) a user account")]
    Activate {
        #[arg(help = "Email address of the account")]
        email: String,

        #[arg(long, help = "Disable the account instead")]
        disable: bool,
    },
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve {
        port: None,
        in_memory: false,
    });

    match command {
        Commands::Serve { port, in_memory } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            if in_memory {
                config.database.backend = StoreBackend::Memory;
            }
            serve(config).await
        }
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Activate { email, disable } => {
            let store = open_store(&config).await?;
            let state = AppState::new(config, store)?;
            let user = state.users.set_enabled(&email, !disable).await?;
            println!(
                "User {} <{}> is now {}",
                user.id,
                user.email,
                if user.is_enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
    }
}

/// Opens the configured backend. Postgres pools are migrated before use.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.database.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect to the database")?;
            DatabaseManager::migrate(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let store = open_store(&config).await?;
    let router = app(AppState::new(config, store)?);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
