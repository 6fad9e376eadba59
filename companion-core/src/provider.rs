use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::FetchError, model::Coordinates, model::CurrentConditions};

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// A source of current weather conditions.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_conditions(
        &self,
        coordinates: Coordinates,
    ) -> Result<CurrentConditions, FetchError>;
}

/// Keep error messages short when a provider answers with an HTML error page.
pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
