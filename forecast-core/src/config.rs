use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

use crate::{Units, provider::openweather::DEFAULT_BASE_URL};

pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";
pub const PORT_ENV: &str = "PORT";
pub const GATEWAY_URL_ENV: &str = "FORECAST_GATEWAY_URL";

/// Upstream provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    /// "metric", "imperial" or "" for Kelvin.
    pub units: String,
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub bind_address: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self { bind_address: "127.0.0.1".to_string(), port: 5000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub gateway_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { gateway_url: "http://127.0.0.1:5000".to_string() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [provider]
/// api_key = "..."
/// units = "metric"
///
/// [gateway]
/// port = 5000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub gateway: GatewayConfig,
    pub client: ClientConfig,
}

impl Config {
    /// Load config from the platform config directory, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        let mut cfg = Self::load_from(&path)?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from `path`, or return defaults if it doesn't exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "forecast", "forecast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `OPENWEATHER_API_KEY`, `PORT` and `FORECAST_GATEWAY_URL` on top of the file values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
        if let Some(port) = lookup(PORT_ENV) {
            self.gateway.port = port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("{PORT_ENV} must be a port number, got '{port}'"))?;
        }
        if let Some(url) = lookup(GATEWAY_URL_ENV) {
            self.client.gateway_url = url;
        }
        Ok(())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.provider.api_key = Some(api_key);
    }

    /// Returns the API key, failing when none is configured.
    pub fn require_api_key(&self) -> Result<&str> {
        self.provider
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: set {API_KEY_ENV} or run `forecast configure`."
                )
            })
    }

    pub fn units(&self) -> Result<Units> {
        self.provider
            .units
            .parse::<Units>()
            .with_context(|| format!("Invalid units in config: '{}'", self.provider.units))
    }
}
