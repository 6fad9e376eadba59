use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use companion_core::{
    CachedOutcome, Config, Coordinates, FileStore, GeocodeCache, InboundMessage, Preferences,
    RequestOrchestrator,
};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::channel::StdoutChannel;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "companion", version, about = "Weather companion for the watch face")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Talk to the watch: JSON messages in on stdin, one JSON answer per line on stdout.
    Serve,

    /// Answer a single weather request and print the message the watch would get.
    Request,

    /// Manage the preferred place name.
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Inspect or reset the geocode cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Interactively set the fallback device position.
    Configure,
}

#[derive(Debug, Subcommand)]
pub enum LocationAction {
    /// Use a place name instead of the device position.
    Set {
        /// Free-text place name, e.g. "Reykjavik".
        name: String,
    },
    /// Go back to the device position.
    Clear,
    Show,
}

#[derive(Debug, Subcommand)]
pub enum CacheAction {
    Show,
    Clear,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = Config::load()?;
        let store = open_store(&config)?;

        match self.command {
            Command::Serve => {
                let orchestrator = orchestrator(&config, store)?;
                serve(&orchestrator, BufReader::new(tokio::io::stdin())).await?;
            }
            Command::Request => {
                let orchestrator = orchestrator(&config, store)?;
                orchestrator
                    .handle(&InboundMessage::weather_request())
                    .await?;
            }
            Command::Location { action } => {
                let prefs = Preferences::new(store);
                match action {
                    LocationAction::Set { name } => {
                        prefs.set_weather_location(&name)?;
                        println!("Weather location set to '{name}'");
                    }
                    LocationAction::Clear => {
                        prefs.clear_weather_location()?;
                        println!("Weather location cleared; using device position");
                    }
                    LocationAction::Show => match prefs.weather_location()? {
                        Some(name) => println!("{name}"),
                        None => println!("(device position)"),
                    },
                }
            }
            Command::Cache { action } => {
                let cache = GeocodeCache::new(store);
                match action {
                    CacheAction::Show => match cache.current() {
                        Some((query, CachedOutcome::Success(coords))) => {
                            println!("'{query}' -> {coords}")
                        }
                        Some((query, CachedOutcome::Failure)) => {
                            println!("'{query}' -> failed lookup")
                        }
                        None => println!("(empty)"),
                    },
                    CacheAction::Clear => {
                        cache.clear()?;
                        println!("Geocode cache cleared");
                    }
                }
            }
            Command::Configure => configure(config)?,
        }

        Ok(())
    }
}

fn open_store(config: &Config) -> Result<Arc<FileStore>> {
    let path = match &config.store_path {
        Some(path) => path.clone(),
        None => FileStore::default_path()?,
    };

    Ok(Arc::new(FileStore::open(path)?))
}

fn orchestrator(config: &Config, store: Arc<FileStore>) -> Result<RequestOrchestrator> {
    RequestOrchestrator::from_config(config, store, Arc::new(StdoutChannel))
}

/// One inbound message per line; malformed lines are logged and skipped.
async fn serve<R>(orchestrator: &RequestOrchestrator, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    orchestrator.announce_ready().await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await.context("Failed to read watch input")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let message: InboundMessage = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("Ignoring malformed watch message: {}", e);
                continue;
            }
        };

        if let Err(e) = orchestrator.handle(&message).await {
            tracing::error!("{:#}", e);
        }
    }

    tracing::info!("Watch channel closed");
    Ok(())
}

fn configure(mut config: Config) -> Result<()> {
    let fixed = inquire::Confirm::new("Use a fixed device position when no place name is set?")
        .with_default(config.device_coordinates().ok().flatten().is_some())
        .prompt()?;

    let coordinates = if fixed {
        let latitude = inquire::CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()?;
        let longitude = inquire::CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()?;
        Some(Coordinates::new(latitude, longitude)?)
    } else {
        None
    };

    config.set_device_coordinates(coordinates);
    config.save()?;

    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use companion_core::{DeviceChannel, OutboundMessage};
    use parking_lot::Mutex;

    #[derive(Debug, Default)]
    struct RecordingChannel {
        sent: Mutex<Vec<OutboundMessage>>,
    }

    #[async_trait]
    impl DeviceChannel for RecordingChannel {
        async fn send(&self, message: &OutboundMessage) -> Result<()> {
            self.sent.lock().push(*message);
            Ok(())
        }
    }

    #[tokio::test]
    async fn serve_announces_ready_and_answers_each_request_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, "{\"local.WeatherLocation\": \"Rey").unwrap();

        let store = Arc::new(FileStore::open(&path).unwrap());
        let channel = Arc::new(RecordingChannel::default());
        // No place name and no device position: every request fails without network.
        let orchestrator =
            RequestOrchestrator::from_config(&Config::default(), store, channel.clone()).unwrap();

        let input = "\n{bad\n{\"weatherRequest\":0}\n{\"weatherRequest\":1}\n";
        serve(&orchestrator, input.as_bytes()).await.unwrap();

        assert_eq!(
            *channel.sent.lock(),
            vec![OutboundMessage::Ready, OutboundMessage::WeatherFailed]
        );
    }

    #[tokio::test]
    async fn serve_skips_blank_lines_and_accepts_truthy_flags() {
        let store = Arc::new(companion_core::MemoryStore::new());
        let channel = Arc::new(RecordingChannel::default());
        let orchestrator =
            RequestOrchestrator::from_config(&Config::default(), store, channel.clone()).unwrap();

        let input = "{\"weatherRequest\":true}\n   \n{\"weatherRequest\":\"1\"}\n";
        serve(&orchestrator, input.as_bytes()).await.unwrap();

        assert_eq!(
            *channel.sent.lock(),
            vec![
                OutboundMessage::Ready,
                OutboundMessage::WeatherFailed,
                OutboundMessage::WeatherFailed
            ]
        );
    }
}
