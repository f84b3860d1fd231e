use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::KcalError;

pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/calendar"];
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_TIME_ZONE: &str = "America/Los_Angeles";
pub const DEFAULT_ICS_LOCATION: &str = "The Oregon Community 700 NE Dekum St. Portland OR";
pub const DEFAULT_CALENDAR: &str = "primary";

/// Settings read from `config.toml`. Every field is optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OAuth client downloaded from the Google Cloud console
    pub client_secret: PathBuf,

    /// Where the access/refresh token pair is persisted between runs
    pub token_path: PathBuf,

    /// IANA zone attached to uploaded all-day events
    pub time_zone: String,

    /// Location written into every exported .ics event
    pub ics_location: String,

    /// Calendar display names to sync into
    pub calendars: Vec<String>,

    pub scopes: Vec<String>,

    pub api_base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            client_secret: program_dir().join("credentials.json"),
            token_path: config_dir()
                .map(|dir| dir.join("token.json"))
                .unwrap_or_else(|_| PathBuf::from("token.json")),
            time_zone: DEFAULT_TIME_ZONE.to_string(),
            ics_location: DEFAULT_ICS_LOCATION.to_string(),
            calendars: vec![DEFAULT_CALENDAR.to_string()],
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl Config {
    /// Load from an explicit path, or from `~/.config/kcal/config.toml` when
    /// present. A missing default file yields the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = config_path()?;
                if !path.exists() {
                    tracing::debug!(path = %path.display(), "no config file, using defaults");
                    return Ok(Config::default());
                }
                path
            }
        };

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;

        Config::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Config> {
        let mut config: Config = toml::from_str(contents)?;
        config.client_secret = expand_path(&config.client_secret);
        config.token_path = expand_path(&config.token_path);
        Ok(config)
    }

    /// Replace the configured calendars when any were given on the command line
    pub fn with_calendars(mut self, calendars: Vec<String>) -> Self {
        if !calendars.is_empty() {
            self.calendars = calendars;
        }
        self
    }

    pub fn tz(&self) -> Result<Tz> {
        self.time_zone
            .parse::<Tz>()
            .map_err(|_| KcalError::InvalidTimeZone(self.time_zone.clone()).into())
    }
}

/// Get the config directory path (~/.config/kcal)
pub fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .context("Could not determine config directory")?
        .join("kcal");
    Ok(config_dir)
}

/// Get the config file path (~/.config/kcal/config.toml)
pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Directory holding the running executable, falling back to the working directory
fn program_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.canonicalize().ok())
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expand ~ in paths to the home directory
pub fn expand_path(path: &Path) -> PathBuf {
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
