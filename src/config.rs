use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use time::UtcOffset;
use tracing::level_filters::LevelFilter;

pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 2000;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub app: AppSection,
    pub logging: LoggingSection,
    pub parking: ParkingSection,
    #[serde(default)]
    pub server: Option<ServerSection>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSection {
    pub name: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSection {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ParkingSection {
    /// Number of physical slots
    pub capacity: u32,
    /// Offset from UTC, in whole hours, used for day and month boundaries (default: 0)
    pub utc_offset_hours: Option<i8>,
    /// JSON file the in-memory session store is seeded from
    pub sessions_path: Option<PathBuf>,
    /// Per-fetch timeout against the session store (default: 2000)
    pub fetch_timeout_ms: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSection {
    /// Port to listen on (default: 8080)
    pub port: Option<u16>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

pub fn load_default() -> Result<Config, ConfigError> {
    load_from_path(DEFAULT_CONFIG_PATH)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&contents)?;
    if config.parking.capacity == 0 {
        return Err(ConfigError::Invalid(
            "[parking].capacity must be greater than zero".to_string(),
        ));
    }
    Ok(config)
}

impl Config {
    pub fn sessions_path(&self) -> Option<&Path> {
        let path = self.parking.sessions_path.as_deref()?;
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    }

    pub fn capacity(&self) -> u32 {
        self.parking.capacity
    }

    pub fn utc_offset(&self) -> Result<UtcOffset, ConfigError> {
        let hours = self.parking.utc_offset_hours.unwrap_or(0);
        UtcOffset::from_hms(hours, 0, 0)
            .map_err(|err| ConfigError::Invalid(format!("utc_offset_hours {hours}: {err}")))
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(
            self.parking
                .fetch_timeout_ms
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_MS),
        )
    }

    /// Returns the server port (default: 8080)
    pub fn server_port(&self) -> u16 {
        self.server
            .as_ref()
            .and_then(|s| s.port)
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    /// Parsed `[logging].level`, falling back to `info` on unknown values.
    pub fn log_level(&self) -> LevelFilter {
        self.logging.level.parse().unwrap_or(LevelFilter::INFO)
    }
}
