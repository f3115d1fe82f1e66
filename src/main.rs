//! Devtools-Bridge server entry point
//!
//! Starts the bridge: a TCP server speaking the devtools actor protocol to
//! debugger clients, translating to the Chrome DevTools Protocol of the
//! configured target.
//!
//! Environment variables:
//! - `BRIDGE_HOST`: listen address (default: 127.0.0.1)
//! - `BRIDGE_PORT`: listen port (default: 6080)
//! - `BRIDGE_TARGET_URL`: target discovery base URL (default: http://localhost:9222)
//! - `BRIDGE_CONFIG`: path to a TOML config file; overrides the above
//! - `RUST_LOG`: log level

use devtools_bridge::config::Config;
use devtools_bridge::server::BridgeServer;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing - respect RUST_LOG environment variable
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|v| v.parse::<Level>().ok())
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Devtools-Bridge v{}", devtools_bridge::VERSION);

    let config = match std::env::var("BRIDGE_CONFIG") {
        Ok(path) => Config::from_file(&path)?,
        Err(_) => Config::from_env()?,
    };
    info!(
        "Configuration loaded: listen={}:{}, target={}",
        config.host, config.port, config.target_url
    );

    let server = BridgeServer::new(config);

    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).unwrap();
        let mut sigint = signal(SignalKind::interrupt()).unwrap();

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}
