use async_trait::async_trait;
use std::fmt::Debug;

use crate::{Coordinates, Units, WeatherError};

pub mod gateway;
pub mod openweather;

/// Message used for a city the geocoder doesn't know.
pub const CITY_NOT_FOUND: &str = "City not found";
/// Message used when the city parameter is missing or blank.
pub const CITY_REQUIRED: &str = "City parameter is required";

/// Source of geocoding, current-weather and forecast data.
///
/// Weather payloads are returned as raw JSON so a relay can pass them through
/// untouched; the client tier parses what it needs. Temperatures in them are
/// expressed in the requested `units`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// All matches for `city`, best first. An unknown city yields an empty list.
    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, WeatherError>;

    async fn current_conditions(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError>;

    async fn forecast(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError>;
}

/// Check a city name before any upstream call is made.
pub fn validate_city(city: Option<&str>) -> Result<&str, WeatherError> {
    city.map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| WeatherError::invalid(CITY_REQUIRED))
}

/// Resolve `city` to the coordinates of its best match.
pub async fn resolve_coordinates<P>(provider: &P, city: &str) -> Result<Coordinates, WeatherError>
where
    P: WeatherProvider + ?Sized,
{
    let city = validate_city(Some(city))?;

    provider
        .geocode(city)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| WeatherError::NotFound(CITY_NOT_FOUND.to_string()))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|i| body.is_char_boundary(*i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
