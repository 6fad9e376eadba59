use anyhow::Result;
use std::sync::Arc;

use crate::store::KeyValueStore;

/// Store key of the user's preferred place name, written by the settings page.
pub const WEATHER_LOCATION_KEY: &str = "local.WeatherLocation";

/// User preferences that live on the phone and are never sent to the watch.
#[derive(Debug, Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Preferred place name; `None` means "use the device position".
    /// An empty value counts as unset.
    pub fn weather_location(&self) -> Result<Option<String>> {
        let value = self.store.get(WEATHER_LOCATION_KEY)?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    pub fn set_weather_location(&self, location: &str) -> Result<()> {
        self.store.set(WEATHER_LOCATION_KEY, location)
    }

    pub fn clear_weather_location(&self) -> Result<()> {
        self.store.remove(WEATHER_LOCATION_KEY)
    }
}
