//! Frontline API server binary.
//!
//! Usage:
//!   frontline-api --config frontline.toml
//!   frontline-api --port 8080
//!   frontline-api --port 8080 --bind 0.0.0.0

use clap::Parser;
use frontline_api::{serve, AppState, RateLimitConfig};
use frontline_coordinator::CoordinatorConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "frontline-api", version, about = "Frontline emergency triage API server")]
struct Cli {
    /// Port to listen on
    #[arg(short, long, env = "FRONTLINE_PORT", default_value_t = 8080)]
    port: u16,

    /// Bind address
    #[arg(short, long, env = "FRONTLINE_BIND_ADDR", default_value = "127.0.0.1")]
    bind: String,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "FRONTLINE_CONFIG")]
    config: Option<PathBuf>,

    /// Allowed CORS origins (comma-separated, `*` for any)
    #[arg(long, env = "FRONTLINE_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,

    /// Requests allowed per client address per minute
    #[arg(
        long,
        env = "FRONTLINE_RATE_LIMIT",
        default_value_t = 120,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    rate_limit: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,frontline_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if cli.bind == "0.0.0.0" {
        tracing::warn!(
            "Server binding to 0.0.0.0 exposes the API to all network interfaces. \
             Make sure a firewall or reverse proxy is in place."
        );
    }

    let config = match &cli.config {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            CoordinatorConfig::from_file(path)?
        }
        None => {
            tracing::info!("Using default configuration");
            CoordinatorConfig::default()
        }
    };

    let cors_origins = cli.cors_origins.map(|origins| {
        origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect::<Vec<_>>()
    });

    let state = AppState::new(config)?.with_rate_limit(RateLimitConfig {
        max_requests: cli.rate_limit,
        window: Duration::from_secs(60),
        ..Default::default()
    });

    let status = state.coordinator.status();
    tracing::info!(
        mode = %status.mode,
        reason = %status.reason,
        services = state.coordinator.directory().services().len(),
        "Pipeline ready"
    );

    let addr: SocketAddr = format!("{}:{}", cli.bind, cli.port).parse()?;
    serve(Arc::new(state), addr, cors_origins).await?;

    Ok(())
}
