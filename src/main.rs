//! Stranger Chat Server - Entry Point
//!
//! Parses the configuration, binds the TCP listener and hands it to the
//! ChatServer actor loop.

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stranger_chat::{serve, Config};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=stranger_chat=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stranger_chat=info")),
        )
        .init();

    let config = Config::parse();

    // Start TCP listener
    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Stranger Chat server listening on {}", addr);
    info!(
        "Ban policy: {} reports, {}s ban",
        config.report_threshold, config.ban_duration_secs
    );

    serve(listener, config.ban_policy()).await?;

    Ok(())
}
