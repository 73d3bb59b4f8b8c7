//! Plain-text rendering of search results.

use std::fmt::Write;

use chrono::{DateTime, TimeZone, Utc};
use forecast_core::{
    ForecastSample, Report, SearchStatus, Units,
    map::MapView,
    view::{IconSize, day_options, icon_url, weekday_label},
};

pub const NO_DAY_DATA: &str = "No Information Yet";

fn date_time<Tz: TimeZone>(time: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format("%a %Y-%m-%d %H:%M").to_string()
}

fn time_of_day<Tz: TimeZone>(time: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    time.with_timezone(tz).format("%H:%M").to_string()
}

/// One hourly or day card.
fn card<Tz: TimeZone>(out: &mut String, sample: &ForecastSample, units: Units, tz: &Tz)
where
    Tz::Offset: std::fmt::Display,
{
    let symbol = units.symbol();
    let _ = writeln!(
        out,
        "  {}  {:>6.1} {symbol}  {:<12} feels like {:.1} {symbol}",
        time_of_day(&sample.time, tz),
        sample.temperature,
        sample.condition,
        sample.feels_like,
    );
}

pub fn status<Tz: TimeZone>(status: &SearchStatus, units: Units, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match status {
        SearchStatus::Idle => String::new(),
        SearchStatus::Loading { city } => format!("Loading weather for {city}...\n"),
        SearchStatus::Failed(message) => format!("Can't find city: {message}\n"),
        SearchStatus::Displaying(report) => self::report(report, units, tz),
    }
}

pub fn report<Tz: TimeZone>(report: &Report, units: Units, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let symbol = units.symbol();
    let now = &report.conditions;
    let mut out = String::new();

    let _ = writeln!(out, "Weather in {} ({})", report.city, report.coordinates);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", date_time(&now.time, tz));
    let _ = writeln!(out, "Current: {:.1} {symbol}  {}", now.temperature, now.condition);
    let _ = writeln!(out, "Feels like {:.1} {symbol}", now.feels_like);
    if !now.icon.is_empty() {
        let _ = writeln!(out, "{}", icon_url(&now.icon, IconSize::Large));
    }

    if !report.view.hourly.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Next hours:");
        for sample in &report.view.hourly {
            card(&mut out, sample, units, tz);
        }
    }

    let options = day_options(&report.view.daily);
    if !options.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Forecast days:");
        for option in options {
            let _ = writeln!(out, "  {}  {}", option.day, option.label);
        }
    }

    out
}

/// The selected day's cards, or the placeholder when it has no data.
pub fn day<Tz: TimeZone>(day: chrono::NaiveDate, samples: Option<&[ForecastSample]>, units: Units, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", weekday_label(day), day);

    match samples {
        Some(samples) if !samples.is_empty() => {
            for sample in samples {
                card(&mut out, sample, units, tz);
                if !sample.icon.is_empty() {
                    let _ = writeln!(out, "         {}", icon_url(&sample.icon, IconSize::Small));
                }
            }
        }
        _ => {
            let _ = writeln!(out, "  {NO_DAY_DATA}");
        }
    }

    out
}

pub fn map(map: &MapView) -> String {
    let (x, y) = map.center_tile();
    let mut out = String::new();

    let _ = writeln!(out, "Map centered on {} (zoom {})", map.center, map.zoom);
    if let Some(marker) = &map.marker {
        let _ = writeln!(out, "  marker: {} at {}", marker.label, marker.position);
    }
    for layer in map.visible_layers() {
        let _ = writeln!(out, "  {}: {}", layer.name, layer.tile_url(map.zoom, x, y));
    }
    let hidden: Vec<_> = map.overlays.iter().filter(|l| !l.enabled).map(|l| l.name.as_str()).collect();
    if !hidden.is_empty() {
        let _ = writeln!(out, "  available overlays: {}", hidden.join(", "));
    }

    out
}
