//! Configuration constants.
//!
//! Defaults for the CLI options and operational parameters of the pipeline.

use std::time::Duration;

/// Interval between progress log lines while the pipeline is running.
pub const LOGGING_INTERVAL: Duration = Duration::from_secs(30);

/// Default SQLite file used as the document store.
pub const DB_PATH: &str = "./geo_searcher.db";
/// Default collection (table) holding resolved places.
pub const DEFAULT_COLLECTION: &str = "places";

pub const DEFAULT_KAFKA_HOST: &str = "localhost";
pub const DEFAULT_KAFKA_PORT: u16 = 9092;
pub const DEFAULT_KAFKA_TOPIC: &str = "coordinates";
pub const DEFAULT_KAFKA_GROUP_ID: &str = "geo_searcher";
/// Kafka session timeout in milliseconds.
pub const KAFKA_SESSION_TIMEOUT_MS: u32 = 6000;

/// Public Nominatim instance.
pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
/// Nominatim's usage policy requires an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = "geo_searcher";
/// Response language requested from the provider.
pub const DEFAULT_LANGUAGE: &str = "en";
/// Per-request timeout for reverse lookups, in seconds.
pub const GEOCODER_TIMEOUT_SECS: u64 = 10;

// Retry strategy (tokio-retry ExponentialBackoff: delay_n = initial^n * factor)
/// Base in milliseconds of the exponential backoff
pub const RETRY_INITIAL_DELAY_MS: u64 = 10;
/// Multiplier applied to every backoff step
pub const RETRY_FACTOR: u64 = 20;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 10;
/// Retries after the first attempt before a timeout becomes a provider error
pub const RETRY_MAX_ATTEMPTS: usize = 5;
