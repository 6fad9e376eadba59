use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    geocode::photon::DEFAULT_PHOTON_URL,
    location::{DEFAULT_LOCATION_MAX_AGE, DEFAULT_LOCATION_TIMEOUT, PositionOptions},
    model::Coordinates,
    provider::openmeteo::DEFAULT_OPEN_METEO_URL,
};

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocode_url: String,
    pub weather_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode_url: DEFAULT_PHOTON_URL.to_string(),
            weather_url: DEFAULT_OPEN_METEO_URL.to_string(),
        }
    }
}

/// Stand-in for the phone's geolocation on hosts that have none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timeout_ms: u64,
    pub maximum_age_secs: u64,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            latitude: None,
            longitude: None,
            timeout_ms: DEFAULT_LOCATION_TIMEOUT.as_millis() as u64,
            maximum_age_secs: DEFAULT_LOCATION_MAX_AGE.as_secs(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [endpoints]
/// geocode_url = "https://photon.komoot.io/api"
///
/// [device]
/// latitude = 64.15
/// longitude = -21.94
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Overrides the platform data directory location of the store file.
    pub store_path: Option<PathBuf>,

    pub endpoints: Endpoints,
    pub device: DeviceConfig,
}

impl Config {
    /// Configured device position; both halves must be present.
    pub fn device_coordinates(&self) -> Result<Option<Coordinates>> {
        match (self.device.latitude, self.device.longitude) {
            (Some(lat), Some(lon)) => Coordinates::new(lat, lon).map(Some),
            (None, None) => Ok(None),
            _ => Err(anyhow!(
                "Device position needs both latitude and longitude.\n\
                 Hint: run `companion configure` to set them."
            )),
        }
    }

    pub fn set_device_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.device.latitude = coordinates.map(|c| c.latitude());
        self.device.longitude = coordinates.map(|c| c.longitude());
    }

    pub fn position_options(&self) -> PositionOptions {
        PositionOptions {
            timeout: Duration::from_millis(self.device.timeout_ms),
            maximum_age: Duration::from_secs(self.device.maximum_age_secs),
        }
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-companion", "companion")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
