//! Handles inbound watch messages and answers weather requests.
//!
//! Every weather request ends in exactly one outbound message: a reading on
//! success, `weatherFailed` on any failure. The watch is never told why.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    cache::GeocodeCache,
    channel::DeviceChannel,
    config::Config,
    error::RequestError,
    geocode::PhotonGeocoder,
    location::{ConfiguredLocationProvider, LocationResolver},
    model::{Coordinates, InboundMessage, OutboundMessage, WeatherReading},
    preferences::Preferences,
    provider::OpenMeteoProvider,
    store::KeyValueStore,
    weather::WeatherFetcher,
};

/// Where the coordinates for a request come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStrategy {
    ByName(String),
    ByDevice,
}

#[derive(Debug, Clone)]
pub struct RequestOrchestrator {
    preferences: Preferences,
    resolver: LocationResolver,
    fetcher: WeatherFetcher,
    channel: Arc<dyn DeviceChannel>,
}

impl RequestOrchestrator {
    pub fn new(
        preferences: Preferences,
        resolver: LocationResolver,
        fetcher: WeatherFetcher,
        channel: Arc<dyn DeviceChannel>,
    ) -> Self {
        Self {
            preferences,
            resolver,
            fetcher,
            channel,
        }
    }

    /// Wire the default HTTP providers and configured device position around
    /// `store` and `channel`.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        channel: Arc<dyn DeviceChannel>,
    ) -> Result<Self> {
        let device_position = config
            .device_coordinates()
            .context("Invalid device position in config")?;

        let resolver = LocationResolver::new(
            GeocodeCache::new(store.clone()),
            Arc::new(PhotonGeocoder::new(config.endpoints.geocode_url.clone())),
            Arc::new(ConfiguredLocationProvider::new(device_position)),
        )
        .with_position_options(config.position_options());

        let fetcher = WeatherFetcher::new(Arc::new(OpenMeteoProvider::new(
            config.endpoints.weather_url.clone(),
        )));

        Ok(Self::new(
            Preferences::new(store),
            resolver,
            fetcher,
            channel,
        ))
    }

    pub fn resolver(&self) -> &LocationResolver {
        &self.resolver
    }

    /// Tell the watch the companion is up.
    pub async fn announce_ready(&self) -> Result<()> {
        self.send(OutboundMessage::Ready).await
    }

    /// React to one inbound message. Messages that do not ask for weather
    /// are ignored.
    pub async fn handle(&self, message: &InboundMessage) -> Result<()> {
        if !message.requests_weather() {
            tracing::debug!("Inbound message without weather request, ignoring");
            return Ok(());
        }

        let outbound = self.answer_weather_request().await;
        self.send(outbound).await
    }

    /// Run the whole pipeline and collapse the outcome into the one message
    /// the watch gets.
    pub async fn answer_weather_request(&self) -> OutboundMessage {
        match self.run_weather_request().await {
            Ok(reading) => OutboundMessage::Weather(reading),
            Err(e) => {
                tracing::warn!("Weather request failed: {}", e);
                OutboundMessage::WeatherFailed
            }
        }
    }

    async fn run_weather_request(&self) -> Result<WeatherReading, RequestError> {
        let coordinates = self.resolve(self.strategy()?).await?;
        Ok(self.fetcher.fetch_current(coordinates).await?)
    }

    fn strategy(&self) -> Result<LocationStrategy, RequestError> {
        let location = self
            .preferences
            .weather_location()
            .map_err(|e| RequestError::Preference(format!("{e:#}")))?;

        Ok(match location {
            Some(name) => LocationStrategy::ByName(name),
            None => LocationStrategy::ByDevice,
        })
    }

    async fn resolve(&self, strategy: LocationStrategy) -> Result<Coordinates, RequestError> {
        tracing::debug!(?strategy, "Resolving location");

        let coordinates = match strategy {
            LocationStrategy::ByName(name) => self.resolver.resolve_by_name(&name).await?,
            LocationStrategy::ByDevice => self.resolver.resolve_by_device().await?,
        };

        Ok(coordinates)
    }

    async fn send(&self, message: OutboundMessage) -> Result<()> {
        tracing::info!(?message, "Sending message to watch");
        self.channel
            .send(&message)
            .await
            .context("Failed to send message to watch")
    }
}
