//! Bookapp REST API server binary.
//!
//! Configuration comes from the environment (see
//! [`bookapp_api::config::ApiConfig::from_env`]); command-line flags override it.

use std::path::Path;

use bookapp_api::config::ApiConfig;
use bookapp_core::auth::policy::PolicyEnforcer;
use bookapp_core::storage::Storage;
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "bookapp_server", about = "Bookapp REST API server")]
struct Args {
    /// Address to listen on, e.g. `0.0.0.0:3333`.
    #[arg(long)]
    bind_addr: Option<String>,

    /// PostgreSQL connection URL.
    #[arg(long)]
    database_url: Option<String>,

    /// Policy CSV replacing the embedded rule set.
    #[arg(long)]
    policy_file: Option<String>,

    /// Maximum number of database connections in the pool.
    #[arg(long)]
    max_connections: Option<u32>,

    /// Skip running database migrations at start-up.
    #[arg(long, default_value_t = false)]
    skip_migrations: bool,
}

impl Args {
    fn apply(self, mut config: ApiConfig) -> ApiConfig {
        if let Some(addr) = self.bind_addr {
            config.bind_addr = addr;
        }
        if let Some(url) = self.database_url {
            config.pg_connection_url = url;
        }
        if let Some(path) = self.policy_file {
            config.policy_file_path = Some(path);
        }
        if let Some(max) = self.max_connections {
            config.db_max_connections = max;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,bookapp_api=debug,bookapp_core=debug".into()),
        )
        .init();

    let args = Args::parse();
    let skip_migrations = args.skip_migrations;
    let config = args.apply(ApiConfig::from_env());

    info!(
        bind_addr = %config.bind_addr,
        max_connections = config.db_max_connections,
        "starting bookapp_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&config.pg_connection_url)
        .await?;

    if skip_migrations {
        warn!("skipping database migrations");
    } else {
        info!("running database migrations");
        bookapp_api::migrate(&pool).await?;
    }

    let policy = match config.policy_file_path.as_deref() {
        Some(path) => PolicyEnforcer::from_file(Path::new(path)).await?,
        None => PolicyEnforcer::with_default_rules().await?,
    };

    let bind_addr = config.bind_addr.clone();
    let state = bookapp_api::AppState::new(Storage::postgres(pool), config, policy);
    let app = bookapp_api::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %listener.local_addr()?, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_environment() {
        let args = Args::parse_from([
            "bookapp_server",
            "--bind-addr",
            "127.0.0.1:8080",
            "--max-connections",
            "3",
        ]);
        let config = args.apply(ApiConfig::default());
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.db_max_connections, 3);
        assert_eq!(config.pg_connection_url, ApiConfig::default().pg_connection_url);
        assert_eq!(config.policy_file_path, None);
    }
}
