use std::fmt;
use std::fmt::Formatter;

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use forecast_core::WeatherError;
use serde_json::json;

/// Error returned from a handler, rendered as `{"error": message}`
///
#[derive(Debug)]
pub struct ApiError(pub WeatherError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self { ApiError(e) }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            WeatherError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            WeatherError::NotFound(_) => StatusCode::NOT_FOUND,
            WeatherError::Upstream { status: Some(status), .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            WeatherError::Upstream { status: None, .. } | WeatherError::EmptyForecast => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.0.to_string() }))
    }
}
