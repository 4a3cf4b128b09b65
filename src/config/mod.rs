//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::models::ChipPeriod;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// League and prize settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueConfig {
    /// Classic league ID on the fantasy API
    #[serde(default = "default_league_id")]
    pub league_id: u64,

    /// Prize pool split between each gameweek's top scorers
    #[serde(default = "default_weekly_prize")]
    pub weekly_prize: f64,

    /// Number of gameweeks in a season
    #[serde(default = "default_season_length")]
    pub season_length: u32,

    /// Last gameweek of the first chip period
    #[serde(default = "default_half_season_boundary")]
    pub half_season_boundary: u32,

    /// Explicit chip periods; overrides the half-season split when non-empty
    #[serde(default)]
    pub chip_periods: Vec<ChipPeriod>,

    /// How long a loaded snapshot stays fresh ("60s", "5m", "1h"; "0s" or
    /// "never" keeps it until an explicit reload)
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,
}

fn default_league_id() -> u64 {
    16511
}

fn default_weekly_prize() -> f64 {
    10.0
}

fn default_season_length() -> u32 {
    38
}

fn default_half_season_boundary() -> u32 {
    19
}

fn default_cache_ttl() -> String {
    "60s".to_string()
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            league_id: default_league_id(),
            weekly_prize: default_weekly_prize(),
            season_length: default_season_length(),
            half_season_boundary: default_half_season_boundary(),
            chip_periods: Vec::new(),
            cache_ttl: default_cache_ttl(),
        }
    }
}

impl LeagueConfig {
    /// Chip periods in effect: the explicit list, or the two season halves.
    pub fn periods(&self) -> Vec<ChipPeriod> {
        if !self.chip_periods.is_empty() {
            return self.chip_periods.clone();
        }
        ChipPeriod::halves(self.half_season_boundary, self.season_length)
    }

    /// Snapshot TTL. `None` means the snapshot never expires.
    pub fn cache_ttl(&self) -> Option<Duration> {
        parse_ttl(&self.cache_ttl).filter(|d| !d.is_zero())
    }
}

/// Parse a TTL such as "90", "90s", "5m" or "1h". "never" reads as zero.
fn parse_ttl(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("never") {
        return Some(Duration::ZERO);
    }

    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let secs_per_unit = match unit.trim() {
        "" | "s" => 1,
        "m" => 60,
        "h" => 3600,
        _ => return None,
    };

    let amount: u64 = digits.parse().ok()?;
    amount.checked_mul(secs_per_unit).map(Duration::from_secs)
}

/// Fantasy API client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Max retries per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between requests
    #[serde(default = "default_request_delay")]
    pub request_delay_ms: u64,
}

fn default_base_url() -> String {
    "https://fantasy.premierleague.com/api/".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_request_delay() -> u64 {
    200
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            max_retries: default_max_retries(),
            request_delay_ms: default_request_delay(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub league: LeagueConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            league: LeagueConfig::default(),
            fetch: FetchConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, otherwise use defaults.
    pub fn load_or_default(path: &PathBuf) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.league.weekly_prize.is_finite() && self.league.weekly_prize > 0.0) {
            return Err(ConfigError::ValidationError(
                "Weekly prize must be a positive amount".to_string(),
            ));
        }

        if self.league.season_length == 0 {
            return Err(ConfigError::ValidationError(
                "Season length must be greater than 0".to_string(),
            ));
        }

        if self.league.chip_periods.is_empty()
            && (self.league.half_season_boundary == 0
                || self.league.half_season_boundary >= self.league.season_length)
        {
            return Err(ConfigError::ValidationError(format!(
                "Half-season boundary must be between 1 and {}",
                self.league.season_length - 1
            )));
        }

        if let Some(period) = self.league.chip_periods.iter().find(|p| p.first > p.last) {
            return Err(ConfigError::ValidationError(format!(
                "Chip period '{}' ends before it starts",
                period.label
            )));
        }

        if parse_ttl(&self.league.cache_ttl).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "Invalid cache TTL: {}",
                self.league.cache_ttl
            )));
        }

        if self.fetch.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Fetch timeout must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
