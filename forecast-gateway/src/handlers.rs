use actix_web::{HttpResponse, get, web};
use forecast_core::{
    Coordinates, Units, WeatherError,
    provider::{CITY_NOT_FOUND, validate_city},
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::AppState;
use crate::errors::ApiError;

#[derive(Deserialize, Debug)]
struct GeoParams {
    city: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CoordinateParams {
    lat: Option<String>,
    lon: Option<String>,
    units: Option<String>,
}

impl CoordinateParams {
    fn coordinates(&self) -> Result<Coordinates, WeatherError> {
        Coordinates::from_query(self.lat.as_deref(), self.lon.as_deref())
    }

    /// `units=` (empty) selects Kelvin; an absent parameter falls back to `default`.
    fn units(&self, default: Units) -> Result<Units, WeatherError> {
        match self.units.as_deref() {
            Some(units) => units.trim().parse(),
            None => Ok(default),
        }
    }
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(geo).service(weather).service(forecast);
}

// city=London
#[get("/geo")]
async fn geo(params: web::Query<GeoParams>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    info!("{:?}", params);

    let city = validate_city(params.city.as_deref())?;
    let matches = data.provider.geocode(city).await.inspect_err(|e| warn!("geocoding {city} failed: {e}"))?;

    if matches.is_empty() {
        return Err(WeatherError::NotFound(CITY_NOT_FOUND.to_string()).into());
    }

    Ok(HttpResponse::Ok().json(matches))
}

// lat=51.5&lon=-0.1&units=metric
#[get("/weather")]
async fn weather(params: web::Query<CoordinateParams>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    info!("{:?}", params);

    let at = params.coordinates()?;
    let units = params.units(data.default_units)?;
    let body = data
        .provider
        .current_conditions(at, units)
        .await
        .inspect_err(|e| warn!("current weather for {at} failed: {e}"))?;

    Ok(HttpResponse::Ok().json(body))
}

#[get("/forecast")]
async fn forecast(params: web::Query<CoordinateParams>, data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    info!("{:?}", params);

    let at = params.coordinates()?;
    let units = params.units(data.default_units)?;
    let body = data
        .provider
        .forecast(at, units)
        .await
        .inspect_err(|e| warn!("forecast for {at} failed: {e}"))?;

    Ok(HttpResponse::Ok().json(body))
}
