use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use crate::{Coordinates, Units, WeatherError};

use super::{WeatherProvider, truncate_body};

/// Client for the gateway's own `/geo`, `/weather` and `/forecast` endpoints.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl GatewayClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<serde_json::Value, WeatherError> {
        let url = format!("{}{}", self.base_url, path);

        let res = self.http.get(&url).query(query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(error_from_response(status, &body));
        }

        Ok(serde_json::from_str(&body)?)
    }

    /// The gateway reads `units` with the same keys as the config file.
    async fn get_at(&self, path: &str, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError> {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();
        self.get(path, &[("lat", lat.as_str()), ("lon", lon.as_str()), ("units", units.as_str())])
            .await
    }
}

/// Map a gateway `{error}` response back onto the error taxonomy.
fn error_from_response(status: StatusCode, body: &str) -> WeatherError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| format!("Gateway request failed with status {status}: {}", truncate_body(body)));

    match status {
        StatusCode::BAD_REQUEST => WeatherError::InvalidRequest(message),
        StatusCode::NOT_FOUND => WeatherError::NotFound(message),
        _ => WeatherError::upstream(Some(status.as_u16()), message),
    }
}

#[async_trait]
impl WeatherProvider for GatewayClient {
    async fn geocode(&self, city: &str) -> Result<Vec<Coordinates>, WeatherError> {
        let body = self.get("/geo", &[("city", city)]).await?;
        Ok(serde_json::from_value(body)?)
    }

    async fn current_conditions(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError> {
        self.get_at("/weather", at, units).await
    }

    async fn forecast(&self, at: Coordinates, units: Units) -> Result<serde_json::Value, WeatherError> {
        self.get_at("/forecast", at, units).await
    }
}
