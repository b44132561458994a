use common::logging;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_SNAPSHOT_LENGTH: usize = dpi::parser::DEFAULT_SNAPSHOT_LENGTH;
pub const DEFAULT_RECENT_CAPACITY: usize = 1000;
pub const DEFAULT_HISTORY_CAPACITY: usize = 50000;
pub const DEFAULT_READ_TIMEOUT_MS: u32 = 100;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub log_format: String,
    pub log_level: LevelFilter,
    pub log_to_file: bool,

    /// Name or description of the capture device, first usable if not set.
    pub interface: Option<String>,

    pub snapshot_length: usize,
    pub recent_capacity: usize,
    pub history_enabled: bool,
    pub history_capacity: usize,

    /// Upper bound of a single blocking read, so of the stop latency too.
    pub read_timeout_ms: u32,
    pub poll_interval_ms: u64,

    /// Simultaneous dump target, enabled at capture start when set.
    pub dump_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_format: logging::DEFAULT_FORMAT.to_string(),
            log_level: LevelFilter::Info,
            log_to_file: false,
            interface: None,
            snapshot_length: DEFAULT_SNAPSHOT_LENGTH,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            history_enabled: true,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            dump_file: None,
        }
    }
}

impl Config {
    pub fn from_file() -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(CONFIG_FILENAME);
        if data.is_err() {
            let config = Config::default();
            config.save_to_file()?;
            return Ok(config);
        }

        Self::from_toml(&data.unwrap_or_default())
    }

    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        let dto: ConfigDto =
            toml::from_str(data).map_err(ConfigError::TomlDeserializationError)?;
        dto.into_config()
    }

    pub fn save_to_file(&self) -> Result<(), ConfigError> {
        let data = toml::to_string(&ConfigDto::from(self))
            .map_err(ConfigError::TomlSerializationError)?;

        std::fs::write(CONFIG_FILENAME, data).map_err(ConfigError::IOError)?;

        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(default)]
struct ConfigDto {
    log_level: String,
    log_format: String,
    log_to_file: bool,
    interface: Option<String>,
    snapshot_length: usize,
    recent_capacity: usize,
    history_enabled: bool,
    history_capacity: usize,
    read_timeout_ms: u32,
    poll_interval_ms: u64,
    dump_file: Option<PathBuf>,
}

impl Default for ConfigDto {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ConfigDto {
    fn from(config: &Config) -> Self {
        Self {
            log_level: config.log_level.to_string().to_lowercase(),
            log_format: config.log_format.clone(),
            log_to_file: config.log_to_file,
            interface: config.interface.clone(),
            snapshot_length: config.snapshot_length,
            recent_capacity: config.recent_capacity,
            history_enabled: config.history_enabled,
            history_capacity: config.history_capacity,
            read_timeout_ms: config.read_timeout_ms,
            poll_interval_ms: config.poll_interval_ms,
            dump_file: config.dump_file.clone(),
        }
    }
}

impl ConfigDto {
    fn into_config(self) -> Result<Config, ConfigError> {
        if self.recent_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("recent_capacity"));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("history_capacity"));
        }

        Ok(Config {
            log_format: self.log_format,
            log_level: LevelFilter::from_str(self.log_level.trim())
                .map_err(|_| ConfigError::UnknownLogLevel)?,
            log_to_file: self.log_to_file,
            interface: self.interface.filter(|name| !name.trim().is_empty()),
            snapshot_length: self.snapshot_length,
            recent_capacity: self.recent_capacity,
            history_enabled: self.history_enabled,
            history_capacity: self.history_capacity,
            read_timeout_ms: self.read_timeout_ms,
            poll_interval_ms: self.poll_interval_ms,
            dump_file: self.dump_file,
        })
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO Error.")]
    IOError(#[from] std::io::Error),

    #[error("TOML Serialization Error.")]
    TomlSerializationError(#[from] toml::ser::Error),

    #[error("TOML Deserialization Error.")]
    TomlDeserializationError(#[from] toml::de::Error),

    #[error("Unknown log level.")]
    UnknownLogLevel,

    #[error("Buffer capacity \"{0}\" must be greater than zero.")]
    ZeroCapacity(&'static str),
}

impl ConfigError {
    pub fn additional_info(&self) -> Option<String> {
        match self {
            ConfigError::IOError(err) => Some(err.to_string()),
            ConfigError::TomlSerializationError(err) => Some(err.to_string()),
            ConfigError::TomlDeserializationError(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
