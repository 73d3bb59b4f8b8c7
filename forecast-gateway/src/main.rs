mod errors;
mod handlers;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use forecast_core::{Config, OpenWeatherProvider, Units, WeatherProvider};
use tracing::info;

struct AppState {
    provider: Arc<dyn WeatherProvider>,
    /// Used when a request carries no `units` parameter.
    default_units: Units,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::load()?;
    let api_key = config.require_api_key()?;
    let units = config.units()?;

    let provider = OpenWeatherProvider::from_config(&config.provider, api_key)
        .context("Failed to build OpenWeather client")?;
    let state = web::Data::new(AppState { provider: Arc::new(provider), default_units: units });

    let bind = (config.gateway.bind_address.clone(), config.gateway.port);
    info!(address = %bind.0, port = bind.1, %units, "starting forecast gateway");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(handlers::routes)
    })
        .bind(bind)?
        .run()
        .await?;

    Ok(())
}
