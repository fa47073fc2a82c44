//! Parley chat API server binary.
//!
//! Connects to PostgreSQL, applies migrations and serves the chat API until
//! interrupted.

use clap::Parser;
use parley_api::config::{ApiConfig, Environment};
use sqlx::postgres::PgPoolOptions;
use tracing::info;

/// CLI arguments for the API server.
#[derive(Parser, Debug)]
#[command(name = "parley_api_server", about = "Parley chat API server")]
struct Args {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on (0 = ephemeral).
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// PostgreSQL connection URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost:5432/parley"
    )]
    database_url: String,

    /// Maximum number of database connections in the pool.
    #[arg(long, default_value_t = 5)]
    max_connections: u32,

    /// Deployment mode; `production` hides error traces from clients.
    #[arg(long, env = "PARLEY_ENV", default_value_t = Environment::Development)]
    environment: Environment,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,parley_api=debug,parley_core=debug".into()),
        )
        .init();

    let args = Args::parse();

    info!(
        port = args.port,
        environment = %args.environment,
        max_connections = args.max_connections,
        "starting parley_api_server"
    );

    let pool = PgPoolOptions::new()
        .max_connections(args.max_connections)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&args.database_url)
        .await?;

    info!("running database migrations");
    parley_api::migrate(&pool).await?;

    let config = ApiConfig {
        bind_addr: format!("{}:{}", args.host, args.port),
        pg_connection_url: args.database_url,
        environment: args.environment,
    };

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    let local_addr = listener.local_addr()?;

    let state = parley_api::AppState { pool, config };
    let app = parley_api::router(state);

    info!(addr = %local_addr, "REST API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
