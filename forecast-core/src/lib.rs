//! Core library for the forecast gateway and its command-line front end.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The provider abstraction, with OpenWeather and gateway clients
//! - The forecast view model (current sample, hourly window, day buckets)
//! - The search session state machine and the map overlay description
//!
//! It is used by `forecast-gateway` and `forecast-cli`.

pub mod config;
pub mod error;
pub mod map;
pub mod model;
pub mod provider;
pub mod session;
pub mod view;

pub use config::Config;
pub use error::WeatherError;
pub use model::{Coordinates, ForecastPayload, ForecastSample, Units};
pub use provider::{WeatherProvider, gateway::GatewayClient, openweather::OpenWeatherProvider};
pub use session::{Report, SearchStatus, Session};
pub use view::{DailyForecast, ViewModel};
