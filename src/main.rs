use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use employee_directory::api::ApiServer;
use employee_directory::cache::{start_auto_cleanup, CacheStore, CachedValue, TtlCacheStore};
use employee_directory::config::{self, AppConfig};
use employee_directory::{DirectoryService, HttpEmployeeClient};

#[derive(Parser)]
#[command(name = "employee-directory")]
#[command(about = "Caching HTTP front for an employee directory API")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Base URL of the upstream employee API
    #[arg(long, env = "EMPLOYEE_API_BASE_URL")]
    base_url: Option<String>,

    /// Return upstream failures of list and delete calls as empty results
    #[arg(long)]
    fail_open: bool,

    /// Let concurrent cache misses for the same key each go upstream
    #[arg(long)]
    no_dedup: bool,
}

impl Cli {
    /// Command-line values that take precedence over the environment
    fn overrides(&self) -> Vec<(String, String)> {
        let mut overrides = Vec::new();
        if let Some(host) = &self.host {
            overrides.push((config::ENV_HOST.to_string(), host.clone()));
        }
        if let Some(port) = self.port {
            overrides.push((config::ENV_PORT.to_string(), port.to_string()));
        }
        if let Some(base_url) = &self.base_url {
            overrides.push((config::ENV_BASE_URL.to_string(), base_url.clone()));
        }
        if self.fail_open {
            overrides.push((config::ENV_FAILURE_MODE.to_string(), "fail-open".to_string()));
        }
        overrides
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env first so RUST_LOG and the flag fallbacks can come from it
    let _ = dotenv::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "employee_directory=info,tower_http=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut app_config =
        AppConfig::from_env(cli.overrides()).context("Failed to load configuration")?;
    if cli.no_dedup {
        app_config.cache.deduplicate_fetches = false;
    }

    info!(
        "Upstream {} (timeout {:?}, {} mode)",
        app_config.upstream.base_url,
        app_config.upstream.timeout,
        app_config.upstream.failure_mode.as_str()
    );

    let client = HttpEmployeeClient::new(&app_config.upstream.base_url, app_config.upstream.timeout)?
        .with_failure_mode(app_config.upstream.failure_mode);

    let store = Arc::new(TtlCacheStore::<CachedValue>::new(app_config.cache.clone()));
    if app_config.cache.enable_auto_cleanup {
        tokio::spawn(start_auto_cleanup(store.clone()));
    }

    let cache: Arc<dyn CacheStore<CachedValue>> = store;
    let directory =
        DirectoryService::initialize(Arc::new(client), cache, &app_config.cache).await;

    ApiServer::new(app_config.server, Arc::new(directory))
        .start()
        .await
}
