//! Configuration types and CLI options.
//!
//! `Config` is parsed by `clap` from flags or the environment (a `.env` file is
//! loaded beforehand by the binary). The pipeline never sees it directly: each
//! collaborator factory receives only its own settings struct.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::error_handling::InitializationError;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Kafka consumer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KafkaSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub group_id: String,
}

impl KafkaSettings {
    pub fn bootstrap_servers(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store settings: a SQLite file and the table used as collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub database: PathBuf,
    pub collection: String,
}

/// Reverse geocoding provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub language: String,
    pub user_agent: String,
    pub timeout: Duration,
}

/// Bounded exponential backoff for provider timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    pub max_retries: usize,
    pub initial_delay_ms: u64,
    pub factor: u64,
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: RETRY_MAX_ATTEMPTS,
            initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            factor: RETRY_FACTOR,
            max_delay_secs: RETRY_MAX_DELAY_SECS,
        }
    }
}

/// Command-line options and configuration.
///
/// Every option can also be given through the environment.
///
/// # Examples
///
/// ```bash
/// KAFKA_HOST=broker KAFKA_PORT=9092 KAFKA_TOPIC=coordinates KAFKA_GROUPID=geo \
///     geo_searcher --store-database ./places.db
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "geo_searcher",
    about = "Reverse-geocodes coordinate messages from Kafka and stores the places."
)]
pub struct Config {
    /// Log level: error|warn|info|debug|trace
    #[arg(long, env = "LOG_LEVEL", value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    /// Kafka broker host
    #[arg(long, env = "KAFKA_HOST")]
    pub kafka_host: String,

    /// Kafka broker port
    #[arg(long, env = "KAFKA_PORT")]
    pub kafka_port: u16,

    /// Topic carrying coordinate messages
    #[arg(long, env = "KAFKA_TOPIC")]
    pub kafka_topic: String,

    /// Consumer group id
    #[arg(long, env = "KAFKA_GROUPID")]
    pub kafka_group_id: String,

    /// Document store (SQLite file)
    #[arg(long, env = "STORE_DATABASE", value_parser, default_value = DB_PATH)]
    pub store_database: PathBuf,

    /// Collection (table) holding resolved places
    #[arg(long, env = "STORE_COLLECTION", default_value = DEFAULT_COLLECTION)]
    pub store_collection: String,

    /// Nominatim base URL
    #[arg(long, env = "NOMINATIM_URL", default_value = DEFAULT_NOMINATIM_URL)]
    pub nominatim_url: String,

    /// Language of the resolved place names
    #[arg(long, env = "GEOCODER_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// User-Agent sent to the geocoding provider
    #[arg(long, env = "GEOCODER_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request geocoding timeout in seconds
    #[arg(long, env = "GEOCODER_TIMEOUT_SECONDS", default_value_t = GEOCODER_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Retries after a provider timeout before the message is skipped
    #[arg(long, env = "GEOCODER_MAX_RETRIES", default_value_t = RETRY_MAX_ATTEMPTS)]
    pub max_retries: usize,

    /// Backoff base in milliseconds
    #[arg(long, env = "GEOCODER_RETRY_BASE_MS", default_value_t = RETRY_INITIAL_DELAY_MS)]
    pub retry_initial_delay_ms: u64,

    /// Backoff multiplier
    #[arg(long, env = "GEOCODER_RETRY_FACTOR", default_value_t = RETRY_FACTOR)]
    pub retry_factor: u64,

    /// Upper bound for a single backoff delay in seconds
    #[arg(long, env = "GEOCODER_RETRY_MAX_DELAY_SECS", default_value_t = RETRY_MAX_DELAY_SECS)]
    pub retry_max_delay_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            kafka_host: DEFAULT_KAFKA_HOST.to_string(),
            kafka_port: DEFAULT_KAFKA_PORT,
            kafka_topic: DEFAULT_KAFKA_TOPIC.to_string(),
            kafka_group_id: DEFAULT_KAFKA_GROUP_ID.to_string(),
            store_database: PathBuf::from(DB_PATH),
            store_collection: DEFAULT_COLLECTION.to_string(),
            nominatim_url: DEFAULT_NOMINATIM_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_seconds: GEOCODER_TIMEOUT_SECS,
            max_retries: RETRY_MAX_ATTEMPTS,
            retry_initial_delay_ms: RETRY_INITIAL_DELAY_MS,
            retry_factor: RETRY_FACTOR,
            retry_max_delay_secs: RETRY_MAX_DELAY_SECS,
        }
    }
}

impl Config {
    pub fn kafka(&self) -> KafkaSettings {
        KafkaSettings {
            host: self.kafka_host.clone(),
            port: self.kafka_port,
            topic: self.kafka_topic.clone(),
            group_id: self.kafka_group_id.clone(),
        }
    }

    pub fn store(&self) -> StoreSettings {
        StoreSettings {
            database: self.store_database.clone(),
            collection: self.store_collection.clone(),
        }
    }

    pub fn geocoder(&self) -> GeocoderSettings {
        GeocoderSettings {
            base_url: self.nominatim_url.trim_end_matches('/').to_string(),
            language: self.language.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_seconds),
        }
    }

    pub fn retry(&self) -> RetrySettings {
        RetrySettings {
            max_retries: self.max_retries,
            initial_delay_ms: self.retry_initial_delay_ms,
            factor: self.retry_factor,
            max_delay_secs: self.retry_max_delay_secs,
        }
    }

    /// Checks required settings before any connection is attempted.
    pub fn validate(&self) -> Result<(), InitializationError> {
        let required = [
            ("kafka host", &self.kafka_host),
            ("kafka topic", &self.kafka_topic),
            ("kafka group id", &self.kafka_group_id),
            ("store collection", &self.store_collection),
            ("nominatim url", &self.nominatim_url),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(InitializationError::ConfigError(format!(
                    "{name} must not be empty"
                )));
            }
        }
        if self.kafka_port == 0 {
            return Err(InitializationError::ConfigError(
                "kafka port must be non-zero".to_string(),
            ));
        }
        if self.store_database.as_os_str().is_empty() {
            return Err(InitializationError::ConfigError(
                "store database path must not be empty".to_string(),
            ));
        }
        if !is_identifier(&self.store_collection) {
            return Err(InitializationError::ConfigError(format!(
                "store collection {:?} must contain only letters, digits and underscores",
                self.store_collection
            )));
        }
        if self.timeout_seconds == 0 {
            return Err(InitializationError::ConfigError(
                "geocoder timeout must be at least one second".to_string(),
            ));
        }
        Ok(())
    }
}

/// Plain SQL identifier: ASCII letter or underscore, then letters, digits, underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
