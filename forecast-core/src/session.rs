//! Search state machine for the interactive client.
//!
//! Every search is tagged with a sequence number when it starts. A completion
//! is applied only if its tag is still the latest one issued, so a slow
//! search can never overwrite the result of a newer one.

use chrono::{NaiveDate, TimeZone};
use serde::Serialize;

use crate::{
    Coordinates, ForecastPayload, ForecastSample, Units, WeatherError,
    provider::{WeatherProvider, resolve_coordinates},
    view::ViewModel,
};

/// Everything one successful search produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub city: String,
    pub coordinates: Coordinates,
    /// Live conditions from the current-weather endpoint.
    pub conditions: ForecastSample,
    pub view: ViewModel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum SearchStatus {
    #[default]
    Idle,
    Loading { city: String },
    Displaying(Box<Report>),
    Failed(String),
}

/// Handle for an in-flight search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchTicket(u64);

#[derive(Debug, Default)]
pub struct Session {
    status: SearchStatus,
    selected_day: Option<NaiveDate>,
    latest: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> &SearchStatus {
        &self.status
    }

    pub fn report(&self) -> Option<&Report> {
        match &self.status {
            SearchStatus::Displaying(report) => Some(report.as_ref()),
            _ => None,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.report().map(|r| r.coordinates)
    }

    pub fn selected_day(&self) -> Option<NaiveDate> {
        self.selected_day
    }

    /// Start a search. Supersedes any search still in flight.
    pub fn begin(&mut self, city: &str) -> SearchTicket {
        self.latest += 1;
        self.selected_day = None;
        self.status = SearchStatus::Loading { city: city.to_string() };
        tracing::debug!(seq = self.latest, city, "search started");
        SearchTicket(self.latest)
    }

    pub fn is_latest(&self, ticket: SearchTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Apply the outcome of a search. Returns false if the ticket is stale.
    pub fn complete(&mut self, ticket: SearchTicket, result: Result<Report, WeatherError>) -> bool {
        if !self.is_latest(ticket) {
            tracing::debug!(seq = ticket.0, latest = self.latest, "discarding stale search result");
            return false;
        }

        self.status = match result {
            Ok(report) => SearchStatus::Displaying(Box::new(report)),
            Err(e) => {
                tracing::warn!(seq = ticket.0, error = %e, "search failed");
                SearchStatus::Failed(e.to_string())
            }
        };
        true
    }

    /// Choose the day shown in the day view. Only meaningful while displaying.
    pub fn select_day(&mut self, day: NaiveDate) -> bool {
        if self.report().is_none() {
            return false;
        }
        self.selected_day = Some(day);
        true
    }

    /// Samples of the selected day; `None` if nothing is selected or the day has no data.
    pub fn selected_samples(&self) -> Option<&[ForecastSample]> {
        let day = self.selected_day?;
        self.report()?.view.daily.get(day)
    }

    /// Run a complete search against `provider` and apply its result.
    pub async fn search<P, Tz>(&mut self, provider: &P, city: &str, units: Units, tz: &Tz) -> &SearchStatus
    where
        P: WeatherProvider + ?Sized,
        Tz: TimeZone,
    {
        let ticket = self.begin(city);
        let result = fetch_report(provider, city, units, tz).await;
        self.complete(ticket, result);
        &self.status
    }
}

/// Geocode `city`, then fetch current conditions and the forecast concurrently.
pub async fn fetch_report<P, Tz>(provider: &P, city: &str, units: Units, tz: &Tz) -> Result<Report, WeatherError>
where
    P: WeatherProvider + ?Sized,
    Tz: TimeZone,
{
    let coordinates = resolve_coordinates(provider, city).await?;
    tracing::info!(city, %coordinates, "resolved city");

    let (current, forecast) = tokio::try_join!(
        provider.current_conditions(coordinates, units),
        provider.forecast(coordinates, units),
    )?;

    let conditions = ForecastSample::from_json(current)?;
    let payload = ForecastPayload::from_json(forecast)?;
    let view = ViewModel::build(&payload.list, tz)?;

    Ok(Report { city: city.trim().to_string(), coordinates, conditions, view })
}
