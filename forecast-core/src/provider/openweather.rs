use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{Coordinates, Units, WeatherError, config::ProviderConfig};

use super::{WeatherProvider, truncate_body};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";

/// Matches requested from the direct geocoding endpoint.
const GEOCODE_LIMIT: &str = "5";

/// Client for the OpenWeather geocoding, current-weather and 5-day forecast APIs.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(
        api_key: String,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &ProviderConfig, api_key: &str) -> Result<Self, WeatherError> {
        Self::new(api_key.to_owned(), config.base_url.as_str(), Duration::from_secs(config.timeout_secs))
    }

    async fn get_json(&self, path: &str, query: &[(&str, &str)], what: &str) -> Result<serde_json::Value, WeatherError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, ?query, "OpenWeather {what} request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "OpenWeather {what} request failed");
            return Err(WeatherError::upstream(
                Some(status.as_u16()),
                format!(
                    "OpenWeather {what} request failed with status {}: {}",
                    status,
                    upstream_message(&body),
                ),
            ));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::upstream(None, format!("Failed to parse OpenWeather {what} JSON: {e}"))
        })
    }

    async fn get_at(&self, path: &str, at: Coordinates, units: Units, what: &str) -> Result<serde_json::Value, WeatherError> {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();

        self.get_json(
            path,
            &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", units.as_query())],
            what,
        )
        .await
    }
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

/// OpenWeather error bodies look like `{"cod": 401, "message": "..."}`.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, WeatherError> {
        let body = self
            .get_json("/geo/1.0/direct", &[("q", city), ("limit", GEOCODE_LIMIT)], "geocoding")
            .await?;

        let matches: Vec<OwGeoMatch> = serde_json::from_value(body)?;

        Ok(matches.into_iter().map(|m| Coordinates::new(m.lat, m.lon)).collect())
    }

    async fn current_conditions(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError> {
        self.get_at("/data/2.5/weather", at, units, "current weather").await
    }

    async fn forecast(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError> {
        self.get_at("/data/2.5/forecast", at, units, "forecast").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("KEY".into(), server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn geocode_maps_matches_to_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "London"))
            .and(query_param("limit", "5"))
            .and(query_param("appid", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "London", "lat": 51.5073, "lon": -0.1276, "country": "GB"},
                {"name": "London", "lat": 42.9834, "lon": -81.2330, "country": "CA"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let matches = provider(&server).geocode("London").await.unwrap();

        assert_eq!(
            matches,
            vec![Coordinates::new(51.5073, -0.1276), Coordinates::new(42.9834, -81.2330)]
        );
    }

    #[tokio::test]
    async fn current_conditions_relays_body_and_sends_units() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "51.5"))
            .and(query_param("lon", "-0.1"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"main": {"temp": 15}})))
            .mount(&server)
            .await;

        let body = provider(&server)
            .current_conditions(Coordinates::new(51.5, -0.1), Units::Imperial)
            .await
            .unwrap();

        assert_eq!(body, json!({"main": {"temp": 15}}));
    }

    #[tokio::test]
    async fn non_success_status_is_carried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"cod": 401, "message": "Invalid API key."})),
            )
            .mount(&server)
            .await;

        let err = provider(&server)
            .forecast(Coordinates::new(1.0, 2.0), Units::Metric)
            .await
            .unwrap_err();

        assert_eq!(err.upstream_status(), Some(401));
        assert!(err.to_string().contains("Invalid API key."));
    }

    #[tokio::test]
    async fn non_json_body_is_upstream_error_without_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .current_conditions(Coordinates::new(1.0, 2.0), Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, WeatherError::Upstream { status: None, .. }));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([]))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let provider = OpenWeatherProvider::new("KEY".into(), server.uri(), Duration::from_millis(50)).unwrap();

        let err = provider.geocode("London").await.unwrap_err();
        assert!(matches!(err, WeatherError::Upstream { .. }));
        assert!(err.to_string().contains("timed out"));
    }
}
