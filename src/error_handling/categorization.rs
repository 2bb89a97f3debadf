//! Retry strategy for the geocoding provider.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::RetrySettings;
use crate::error_handling::GeocodeError;

/// Creates an exponential backoff retry strategy.
///
/// The iterator yields one delay per retry and is limited to
/// `settings.max_retries`, so a lookup is attempted at most `max_retries + 1` times.
pub fn get_retry_strategy(settings: &RetrySettings) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(settings.initial_delay_ms)
        .factor(settings.factor)
        .max_delay(Duration::from_secs(settings.max_delay_secs))
        .take(settings.max_retries)
}

/// Only provider timeouts are worth another attempt.
pub fn is_retriable(error: &GeocodeError) -> bool {
    matches!(error, GeocodeError::Timeout)
}
