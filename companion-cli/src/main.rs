//! Binary crate for the `companion` command-line tool.
//!
//! This crate focuses on:
//! - Hosting the weather companion over a stdin/stdout watch channel
//! - Managing the preferred place name and the geocode cache
//! - Interactive configuration

use clap::Parser;

mod channel;
mod cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout is the watch channel.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
