//! HTTP client initialization.
//!
//! The geocoding provider is reached through a single shared `reqwest::Client`.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::GeocoderSettings;

/// Initializes the HTTP client used for reverse geocoding.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from settings (Nominatim's usage policy requires one)
/// - Per-request timeout from settings
/// - Rustls TLS backend (no native TLS)
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_client(settings: &GeocoderSettings) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(settings.timeout)
        .user_agent(settings.user_agent.clone())
        .build()?;
    Ok(Arc::new(client))
}
