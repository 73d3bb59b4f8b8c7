use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::WeatherError;

/// A resolved location. Serialized as `{lat, lon}` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Parse the `lat`/`lon` query parameters of a gateway request.
    pub fn from_query(lat: Option<&str>, lon: Option<&str>) -> Result<Self, WeatherError> {
        let (lat, lon) = match (non_empty(lat), non_empty(lon)) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(WeatherError::invalid("Latitude and Longitude are required")),
        };

        let latitude = parse_coordinate("lat", lat)?;
        let longitude = parse_coordinate("lon", lon)?;

        Ok(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, WeatherError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| WeatherError::invalid(format!("{name} must be a number")))
}

/// One point of the upstream forecast time series.
///
/// Deserializes from the OpenWeather entry shape
/// (`{dt, main: {temp, feels_like}, weather: [{main, icon}]}`), which is
/// shared by the current-weather payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OwEntry")]
pub struct ForecastSample {
    pub time: DateTime<Utc>,
    pub temperature: f64,
    pub feels_like: f64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
}

#[derive(Debug, Deserialize)]
struct OwCondition {
    main: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwEntry {
    dt: i64,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwCondition>,
}

impl TryFrom<OwEntry> for ForecastSample {
    type Error = String;

    fn try_from(entry: OwEntry) -> Result<Self, Self::Error> {
        let time = DateTime::from_timestamp(entry.dt, 0)
            .ok_or_else(|| format!("timestamp {} out of range", entry.dt))?;

        let (condition, icon) = match entry.weather.into_iter().next() {
            Some(w) => (w.main, w.icon),
            None => ("Unknown".to_string(), String::new()),
        };

        Ok(ForecastSample {
            time,
            temperature: entry.main.temp,
            feels_like: entry.main.feels_like,
            condition,
            icon,
        })
    }
}

/// The part of the upstream forecast payload the client tier reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastSample>,
}

impl ForecastPayload {
    pub fn from_json(value: serde_json::Value) -> Result<Self, WeatherError> {
        Ok(serde_json::from_value(value)?)
    }
}

impl ForecastSample {
    /// Parse a raw current-weather payload.
    pub fn from_json(value: serde_json::Value) -> Result<Self, WeatherError> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Measurement system requested from the upstream and used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    /// Upstream default: Kelvin.
    Standard,
}

impl Units {
    /// Key accepted by [`Units::from_str`]; the empty string selects Kelvin.
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "",
        }
    }

    /// Value of the upstream `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
            Units::Standard => "K",
        }
    }
}

impl FromStr for Units {
    type Err = WeatherError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "" => Ok(Units::Standard),
            other => Err(WeatherError::invalid(format!(
                "Unknown unit type '{other}'. Supported: metric, imperial, or empty for Kelvin."
            ))),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coordinates_serialize_as_lat_lon() {
        let value = serde_json::to_value(Coordinates::new(51.5, -0.1)).unwrap();
        assert_eq!(value, json!({"lat": 51.5, "lon": -0.1}));
    }

    #[test]
    fn from_query_requires_both_coordinates() {
        let err = Coordinates::from_query(Some("51.5"), None).unwrap_err();
        assert_eq!(err, WeatherError::invalid("Latitude and Longitude are required"));

        let err = Coordinates::from_query(Some(" "), Some("-0.1")).unwrap_err();
        assert_eq!(err.to_string(), "Latitude and Longitude are required");
    }

    #[test]
    fn from_query_rejects_non_numeric_values() {
        let err = Coordinates::from_query(Some("north"), Some("-0.1")).unwrap_err();
        assert_eq!(err.to_string(), "lat must be a number");

        let err = Coordinates::from_query(Some("51.5"), Some("NaN")).unwrap_err();
        assert_eq!(err.to_string(), "lon must be a number");
    }

    #[test]
    fn from_query_parses_valid_pair() {
        let c = Coordinates::from_query(Some("51.5"), Some("-0.1")).unwrap();
        assert_eq!(c, Coordinates::new(51.5, -0.1));
    }

    #[test]
    fn sample_parses_openweather_entry() {
        let sample: ForecastSample = serde_json::from_value(json!({
            "dt": 1_700_000_000,
            "main": {"temp": 12.5, "feels_like": 10.1, "humidity": 80},
            "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
            "wind": {"speed": 3.2}
        }))
        .unwrap();

        assert_eq!(sample.time.timestamp(), 1_700_000_000);
        assert_eq!(sample.temperature, 12.5);
        assert_eq!(sample.feels_like, 10.1);
        assert_eq!(sample.condition, "Clouds");
        assert_eq!(sample.icon, "04d");
    }

    #[test]
    fn sample_without_conditions_is_unknown() {
        let sample = ForecastSample::from_json(json!({
            "dt": 0,
            "main": {"temp": 1.0, "feels_like": 0.0}
        }))
        .unwrap();

        assert_eq!(sample.condition, "Unknown");
        assert!(sample.icon.is_empty());
    }

    #[test]
    fn malformed_payload_is_upstream_error() {
        let err = ForecastPayload::from_json(json!({"cod": "200"})).unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { status: None, .. }));
    }

    #[test]
    fn units_parse_known_keys_only() {
        assert_eq!("metric".parse::<Units>().unwrap(), Units::Metric);
        assert_eq!("imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!("".parse::<Units>().unwrap(), Units::Standard);
        assert!("kelvin".parse::<Units>().is_err());
        assert_eq!(Units::Standard.as_query(), "standard");
    }

    #[test]
    fn units_keys_parse_back() {
        for units in [Units::Metric, Units::Imperial, Units::Standard] {
            assert_eq!(units.as_str().parse::<Units>().unwrap(), units);
        }
        assert_eq!(Units::Standard.as_str(), "");
    }
}
