use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gatepass::cache::RedisCache;
use gatepass::config::Config;
use gatepass::db::SqliteStore;
use gatepass::github::{GithubOAuth, OAuthProvider};
use gatepass::AppState;

#[derive(Parser, Debug)]
#[command(name = "gatepass")]
#[command(author, version, about = "Event-ticketing backend", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "gatepass.toml")]
    config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config)?;

    // Initialize logging
    let log_level = cli
        .log_level
        .as_ref()
        .unwrap_or(&config.logging.level)
        .clone();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting gatepass v{}", env!("CARGO_PKG_VERSION"));

    // Ensure data directory exists
    std::fs::create_dir_all(&config.server.data_dir)?;

    // Initialize stores
    let pool = gatepass::db::init(&config.server.data_dir).await?;
    let store = Arc::new(SqliteStore::new(pool));
    let cache = Arc::new(RedisCache::connect(&config.cache.url).await?);

    let github: Option<Arc<dyn OAuthProvider>> = match &config.oauth.github {
        Some(oauth) => Some(Arc::new(GithubOAuth::new(
            oauth.client_id.clone(),
            oauth.client_secret.clone(),
        )?)),
        None => {
            tracing::warn!("GitHub OAuth not configured; /auth/github/sign-in is disabled");
            None
        }
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let state = Arc::new(AppState::new(config, store, cache, github));
    let router = gatepass::api::create_router(state);

    tracing::info!("API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
