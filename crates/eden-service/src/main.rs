//! Eden service - collaborative curation daemon
//!
//! Serves the curation registry over REST:
//! - Collaborations with vote tallying and automatic curation
//! - Curated collections with permissions and criteria
//! - Single-curator review sessions

use clap::Parser;
use eden_service::error::{DaemonError, DaemonResult};
use eden_service::{Server, ServiceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Eden service CLI
#[derive(Parser)]
#[command(name = "edend")]
#[command(about = "Eden - collaborative curation service", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "EDEN_CONFIG")]
    config: Option<String>,

    /// Listen address, overrides the configuration file
    #[arg(short, long, env = "EDEN_LISTEN_ADDR")]
    listen: Option<String>,

    /// Data directory, overrides the configuration file
    #[arg(short, long, env = "EDEN_DATA_DIR")]
    data_dir: Option<String>,

    /// Log level, overrides the configuration file
    #[arg(long, env = "EDEN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "EDEN_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> DaemonResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = ServiceConfig::load(cli.config.as_deref())
        .map_err(|e| DaemonError::Config(e.to_string()))?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.server.listen_addr = listen
            .parse()
            .map_err(|e| DaemonError::Config(format!("Invalid listen address: {}", e)))?;
    }
    if let Some(data_dir) = cli.data_dir {
        config.storage.data_dir = data_dir.into();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Print startup banner
    println!(
        r#"
  ___ ___  ___ _  _
 | __|   \| __| \| |
 | _|| |) | _|| .` |
 |___|___/|___|_|\_|

  Genesis Registry - Collaborative Curation
  Version: {}
  Data: {}
  Listening: {}
"#,
        env!("CARGO_PKG_VERSION"),
        config.storage.data_dir.display(),
        config.server.listen_addr
    );

    Server::new(config)?.run().await
}
