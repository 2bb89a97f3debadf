//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry parameters, defaults)
//! - CLI option types and parsing
//! - Per-collaborator settings handed to the connection factories

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    is_identifier, Config, GeocoderSettings, KafkaSettings, LogFormat, LogLevel, RetrySettings,
    StoreSettings,
};
