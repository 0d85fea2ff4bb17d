//! Redbridge - HTTP gateway for Redis-compatible stores
//!
//! Accepts HTTP requests describing a store command (URL path, query
//! string, or JSON array body), relays them to the backing store, and
//! returns the reply as JSON. Batches go through `/pipeline` (one round
//! trip) or `/multi-exec` (atomic).

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use redbridge_client::config::{parse_auto_pipelining, parse_database, DEFAULT_SENTINEL_MASTER};
use redbridge_client::{StoreClient, StoreConfig};
use redbridge_gateway::{Gateway, GatewayConfig};

/// Placeholder secret; the server warns loudly when it is still in use.
const PLACEHOLDER_TOKEN: &str = "example_token";

#[derive(Parser)]
#[command(name = "redbridge")]
#[command(author, version, about = "HTTP gateway for Redis-compatible stores", long_about = None)]
struct Cli {
    /// Bind address for the HTTP listener
    #[arg(long, default_value = "0.0.0.0", env = "BIND_ADDRESS")]
    bind_address: String,

    /// Listening port
    #[arg(long, default_value_t = 3000, env = "PORT")]
    port: u16,

    /// Shared secret expected as a bearer token or `_token` query parameter
    #[arg(long, default_value = PLACEHOLDER_TOKEN, env = "AUTH_TOKEN", hide_env_values = true)]
    token: String,

    /// Store host (single-endpoint mode)
    #[arg(long, default_value = "localhost", env = "REDIS_HOST")]
    redis_host: String,

    /// Store port (single-endpoint mode)
    #[arg(long, default_value_t = 6379, env = "REDIS_PORT")]
    redis_port: u16,

    /// Database index; unparseable values select database 0
    #[arg(long, default_value = "0", env = "REDIS_DB")]
    redis_db: String,

    /// Store password (master password in sentinel mode)
    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    redis_password: Option<String>,

    /// Comma-separated `host:port` sentinel list; presence enables
    /// sentinel discovery
    #[arg(long, env = "REDIS_SENTINELS")]
    redis_sentinels: Option<String>,

    /// Master group name monitored by the sentinels
    #[arg(long, default_value = DEFAULT_SENTINEL_MASTER, env = "REDIS_SENTINEL_MASTER")]
    sentinel_master: String,

    /// Password for the sentinel nodes themselves
    #[arg(long, env = "REDIS_SENTINEL_PASSWORD", hide_env_values = true)]
    sentinel_password: Option<String>,

    /// Client-side auto-pipelining; enabled only by exactly "true"
    #[arg(long, default_value = "false", env = "REDIS_AUTO_PIPELINING")]
    auto_pipelining: String,

    /// Disable the permissive CORS layer
    #[arg(long, env = "DISABLE_CORS")]
    disable_cors: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redbridge=info,tower_http=info".into()),
        )
        .with_target(true)
        .init();

    let cli = Cli::parse();

    if cli.token == PLACEHOLDER_TOKEN {
        warn!("AUTH_TOKEN is still the placeholder value; override it before serving real traffic");
    }

    let store_config = StoreConfig {
        host: cli.redis_host,
        port: cli.redis_port,
        database: parse_database(&cli.redis_db),
        password: cli.redis_password,
        sentinels: cli.redis_sentinels,
        sentinel_master: cli.sentinel_master,
        sentinel_password: cli.sentinel_password,
        auto_pipelining: parse_auto_pipelining(&cli.auto_pipelining),
    };

    // Fail fast: a malformed sentinel list or unreachable store aborts
    // startup before the listener opens.
    let store = StoreClient::connect(&store_config).await?;
    info!("store connection established");

    let gateway = Gateway::new(
        GatewayConfig {
            bind_address: cli.bind_address,
            port: cli.port,
            token: cli.token,
            enable_cors: !cli.disable_cors,
        },
        store,
    );

    gateway.run().await.map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}
