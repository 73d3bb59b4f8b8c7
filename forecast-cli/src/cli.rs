use std::{path::PathBuf, time::Duration};

use anyhow::{Context, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use forecast_core::{Config, GatewayClient, SearchStatus, Session, Units, map::MapView};
use inquire::{Password, Select, Text};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather forecast client for the forecast gateway")]
pub struct Cli {
    /// Read configuration from this file instead of the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Gateway base URL, e.g. "http://127.0.0.1:5000".
    #[arg(long, global = true)]
    pub gateway: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key used by the gateway and the map overlays.
    Configure,

    /// Show current conditions and the forecast for a city.
    Search {
        /// City name.
        city: String,

        /// Show one forecast day, as an ISO date or a weekday name.
        #[arg(long)]
        day: Option<String>,

        /// Print the map layers for the city.
        #[arg(long)]
        map: bool,

        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Search repeatedly and browse forecast days.
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        tracing::debug!(path = %config_path.display(), "loading config");
        let mut config = Config::load_from(&config_path)?;
        config.apply_env(|name| std::env::var(name).ok())?;
        if let Some(url) = &self.gateway {
            config.client.gateway_url = url.clone();
        }

        match self.command {
            Command::Configure => configure(config, &config_path),
            Command::Search { city, day, map, json } => {
                search(&config, &city, day.as_deref(), map, json).await
            }
            Command::Interactive => interactive(&config).await,
        }
    }
}

fn gateway_client(config: &Config) -> anyhow::Result<GatewayClient> {
    GatewayClient::new(
        config.client.gateway_url.as_str(),
        Duration::from_secs(config.provider.timeout_secs),
    )
    .context("Failed to build gateway client")
}

fn configure(mut config: Config, path: &std::path::Path) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    config.set_api_key(key.trim().to_string());
    config.require_api_key()?;

    let units = Select::new("Units:", vec![Units::Metric, Units::Imperial, Units::Standard])
        .prompt()
        .context("Failed to read units")?;
    config.provider.units = units.as_str().to_string();

    config.save_to(path)?;
    println!("Configuration saved to {}", path.display());
    Ok(())
}

fn map_for(config: &Config, session: &Session, label: &str) -> MapView {
    let api_key = config.require_api_key().ok();
    MapView::new(session.coordinates(), label, api_key)
}

async fn search(config: &Config, city: &str, day: Option<&str>, show_map: bool, json: bool) -> anyhow::Result<()> {
    let units = config.units()?;
    let client = gateway_client(config)?;
    let mut session = Session::new();

    session.search(&client, city, units, &Local).await;

    let report = match session.status() {
        SearchStatus::Failed(message) => bail!("Can't find city: {message}"),
        SearchStatus::Displaying(report) => report.clone(),
        other => bail!("Search ended in unexpected state: {other:?}"),
    };

    let selected = match day {
        Some(selector) => {
            let date = parse_day(&report, selector)?;
            session.select_day(date);
            Some(date)
        }
        None => None,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print!("{}", render::report(&report, units, &Local));
    if let Some(date) = selected {
        println!();
        print!("{}", render::day(date, session.selected_samples(), units, &Local));
    }
    if show_map {
        println!();
        print!("{}", render::map(&map_for(config, &session, &report.city)));
    }

    Ok(())
}

/// An ISO date is taken as is, even when the forecast has no bucket for it.
/// A weekday name must match one of the forecast days.
fn parse_day(report: &forecast_core::Report, selector: &str) -> anyhow::Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(selector.trim(), "%Y-%m-%d") {
        return Ok(date);
    }
    report
        .view
        .daily
        .find(selector)
        .with_context(|| format!("No forecast for day '{selector}'"))
}

const NEW_SEARCH: &str = "New search";
const SHOW_MAP: &str = "Show map";

async fn interactive(config: &Config) -> anyhow::Result<()> {
    let units = config.units()?;
    let client = gateway_client(config)?;
    let mut session = Session::new();

    loop {
        let city = Text::new("City (empty to quit):").prompt().context("Failed to read city")?;
        let city = city.trim();
        if city.is_empty() {
            return Ok(());
        }

        print!("{}", render::status(&SearchStatus::Loading { city: city.to_string() }, units, &Local));
        let status = session.search(&client, city, units, &Local).await;
        print!("{}", render::status(status, units, &Local));

        if session.report().is_some() {
            browse_days(config, &mut session, units)?;
        }
    }
}

/// Day selector loop. Selecting a day never refetches.
fn browse_days(config: &Config, session: &mut Session, units: Units) -> anyhow::Result<()> {
    loop {
        let Some(report) = session.report() else { return Ok(()) };
        let city = report.city.clone();

        let mut choices: Vec<String> = forecast_core::view::day_options(&report.view.daily)
            .into_iter()
            .map(|o| format!("{} {}", o.label, o.day))
            .collect();
        let days: Vec<_> = report.view.daily.days().collect();
        choices.push(SHOW_MAP.to_string());
        choices.push(NEW_SEARCH.to_string());

        let choice = Select::new("Select a day for forecast:", choices.clone())
            .prompt()
            .context("Failed to read day selection")?;

        match choice.as_str() {
            NEW_SEARCH => return Ok(()),
            SHOW_MAP => print!("{}", render::map(&map_for(config, session, &city))),
            _ => {
                let index = choices.iter().position(|c| *c == choice).unwrap_or(0);
                if let Some(day) = days.get(index).copied() {
                    session.select_day(day);
                    print!("{}", render::day(day, session.selected_samples(), units, &Local));
                }
            }
        }
    }
}
