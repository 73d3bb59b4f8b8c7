use thiserror::Error;

/// Errors surfaced by the gateway, the provider clients and the view-model builder.
///
/// The display text of each variant is the message relayed to callers, so the
/// gateway can render it verbatim as `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// Missing or malformed input. No network call was made.
    #[error("{0}")]
    InvalidRequest(String),

    /// Input was valid but the upstream reported no match.
    #[error("{0}")]
    NotFound(String),

    /// Network failure, timeout, non-2xx status or unreadable body.
    #[error("{message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Forecast contains no samples")]
    EmptyForecast,
}

impl WeatherError {
    pub fn invalid(message: impl Into<String>) -> Self {
        WeatherError::InvalidRequest(message.into())
    }

    pub fn upstream(status: Option<u16>, message: impl Into<String>) -> Self {
        WeatherError::Upstream { status, message: message.into() }
    }

    /// Upstream status code carried by the error, if any.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            WeatherError::Upstream { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        let message = if e.is_timeout() {
            format!("Upstream request timed out: {e}")
        } else {
            e.to_string()
        };
        WeatherError::Upstream { status: e.status().map(|s| s.as_u16()), message }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(e: serde_json::Error) -> Self {
        WeatherError::Upstream { status: None, message: format!("Malformed upstream body: {e}") }
    }
}
