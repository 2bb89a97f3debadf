//! Coordinate to address resolution with bounded timeout retries.

use std::sync::atomic::{AtomicU32, Ordering};

use serde_json::Value;
use tokio_retry::RetryIf;

use crate::config::RetrySettings;
use crate::error_handling::{get_retry_strategy, is_retriable, GeocodeError, ResolveError};
use crate::geocode::Geocoder;
use crate::models::{CoordinateMessage, RawPlace};

/// Nominatim's subdivision code key; copied into `iso` when present.
pub const ISO_SUBDIVISION_KEY: &str = "ISO3166-2-lvl4";

/// Resolves coordinates to the provider's flat address mapping.
pub struct LocationResolver<G> {
    geocoder: G,
    language: String,
    retry: RetrySettings,
}

impl<G: Geocoder> LocationResolver<G> {
    pub fn new(geocoder: G, language: impl Into<String>, retry: RetrySettings) -> Self {
        Self {
            geocoder,
            language: language.into(),
            retry,
        }
    }

    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    /// Looks up the address for `coordinates`.
    ///
    /// `(0, 0)` is rejected without calling the provider. Provider timeouts are
    /// retried with exponential backoff up to `RetrySettings::max_retries`; once
    /// that budget is spent the timeout is reported as [`ResolveError::Provider`].
    pub async fn resolve(&self, coordinates: &CoordinateMessage) -> Result<RawPlace, ResolveError> {
        if coordinates.is_empty() {
            return Err(ResolveError::EmptyCoordinates);
        }

        let CoordinateMessage {
            latitude,
            longitude,
        } = *coordinates;
        let geocoder = &self.geocoder;
        let language = self.language.as_str();
        let attempts = AtomicU32::new(0);

        let response = RetryIf::start(
            get_retry_strategy(&self.retry),
            || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt > 1 {
                    log::debug!(
                        "Retrying reverse lookup for ({latitude}, {longitude}), attempt {attempt}"
                    );
                }
                geocoder.reverse(latitude, longitude, language)
            },
            is_retriable,
        )
        .await;

        match response {
            Ok(body) => address_from_response(&body),
            Err(GeocodeError::Timeout) => Err(ResolveError::Provider(format!(
                "geocoding provider timed out after {} attempts",
                attempts.load(Ordering::SeqCst)
            ))),
            Err(GeocodeError::Provider(message)) => Err(ResolveError::Provider(message)),
        }
    }
}

/// Flattens the `address` object of a provider response into a [`RawPlace`].
///
/// Strings are kept verbatim, numbers and booleans are stringified, nested values
/// are dropped. The ISO subdivision code, when present, overwrites `iso`.
pub fn address_from_response(body: &Value) -> Result<RawPlace, ResolveError> {
    let address = body
        .get("address")
        .and_then(Value::as_object)
        .ok_or_else(|| ResolveError::Provider("response has no address".to_string()))?;

    let mut raw: RawPlace = address
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key.clone(), value))
        })
        .collect();

    if let Some(iso) = raw.get(ISO_SUBDIVISION_KEY).map(str::to_string) {
        raw.insert("iso", iso);
    }
    Ok(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted responses and counts calls.
    struct ScriptedGeocoder {
        responses: Mutex<VecDeque<Result<Value, GeocodeError>>>,
        calls: AtomicU32,
    }

    impl ScriptedGeocoder {
        fn new(responses: Vec<Result<Value, GeocodeError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: AtomicU32::new(0),
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Geocoder for ScriptedGeocoder {
        async fn reverse(
            &self,
            _latitude: f64,
            _longitude: f64,
            language: &str,
        ) -> Result<Value, GeocodeError> {
            assert_eq!(language, "en");
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GeocodeError::Timeout))
        }
    }

    fn fast_retry(max_retries: usize) -> RetrySettings {
        RetrySettings {
            max_retries,
            initial_delay_ms: 1,
            factor: 1,
            max_delay_secs: 1,
        }
    }

    fn resolver(responses: Vec<Result<Value, GeocodeError>>) -> LocationResolver<ScriptedGeocoder> {
        LocationResolver::new(ScriptedGeocoder::new(responses), "en", fast_retry(3))
    }

    fn moscow() -> Value {
        json!({
            "address": {
                "historic": "Kremlin and Red Square, Moscow",
                "city": "Moscow",
                "ISO3166-2-lvl15": "RU-MOW",
                "state": "Moscow",
                "iso": "RU-MOW",
                "region": "Central Federal District",
                "postcode": "103073",
                "country": "Russia",
                "country_code": "ru"
            }
        })
    }

    #[tokio::test]
    async fn test_empty_coordinates_skip_provider() {
        let resolver = resolver(vec![Ok(moscow())]);
        let result = resolver.resolve(&CoordinateMessage::new(0.0, 0.0)).await;
        assert_eq!(result, Err(ResolveError::EmptyCoordinates));
        assert_eq!(resolver.geocoder().calls(), 0);
    }

    #[tokio::test]
    async fn test_resolve_returns_address() {
        let resolver = resolver(vec![Ok(moscow())]);
        let raw = resolver
            .resolve(&CoordinateMessage::new(55.7558, 37.6176))
            .await
            .expect("should resolve");
        assert_eq!(raw.get("city"), Some("Moscow"));
        assert_eq!(raw.get("iso"), Some("RU-MOW"));
        assert_eq!(resolver.geocoder().calls(), 1);
    }

    #[tokio::test]
    async fn test_timeouts_are_retried_until_success() {
        let resolver = resolver(vec![
            Err(GeocodeError::Timeout),
            Err(GeocodeError::Timeout),
            Ok(moscow()),
        ]);
        let raw = resolver
            .resolve(&CoordinateMessage::new(55.7558, 37.6176))
            .await
            .expect("third attempt succeeds");
        assert_eq!(raw.get("country"), Some("Russia"));
        assert_eq!(resolver.geocoder().calls(), 3);
    }

    #[tokio::test]
    async fn test_exhausted_timeouts_become_provider_error() {
        let resolver = resolver(vec![]);
        let result = resolver.resolve(&CoordinateMessage::new(1.0, 2.0)).await;
        match result {
            Err(ResolveError::Provider(msg)) => assert!(msg.contains("4 attempts"), "{msg}"),
            other => panic!("expected provider error, got {:?}", other),
        }
        // initial attempt + 3 retries
        assert_eq!(resolver.geocoder().calls(), 4);
    }

    #[tokio::test]
    async fn test_provider_errors_are_not_retried() {
        let resolver = resolver(vec![
            Err(GeocodeError::Provider("HTTP 403 Forbidden".into())),
            Ok(moscow()),
        ]);
        let result = resolver.resolve(&CoordinateMessage::new(1.0, 2.0)).await;
        assert_eq!(
            result,
            Err(ResolveError::Provider("HTTP 403 Forbidden".into()))
        );
        assert_eq!(resolver.geocoder().calls(), 1);
    }

    #[test]
    fn test_iso_subdivision_overrides_iso() {
        let body = json!({
            "address": {
                "ISO3166-2-lvl4": "FR-IDF",
                "iso": "stale",
                "country": "France",
                "country_code": "fr"
            }
        });
        let raw = address_from_response(&body).expect("has address");
        assert_eq!(raw.get("iso"), Some("FR-IDF"));
        assert_eq!(raw.get(ISO_SUBDIVISION_KEY), Some("FR-IDF"));
    }

    #[test]
    fn test_iso_kept_without_subdivision_key() {
        let raw = address_from_response(&moscow()).expect("has address");
        assert_eq!(raw.get("iso"), Some("RU-MOW"));
    }

    #[test]
    fn test_address_values_are_flattened() {
        let body = json!({
            "address": {"house_number": 52, "city": "Saint Petersburg", "extra": {"nested": true}}
        });
        let raw = address_from_response(&body).expect("has address");
        assert_eq!(raw.get("house_number"), Some("52"));
        assert!(!raw.contains_key("extra"));
    }

    #[test]
    fn test_missing_address_is_provider_error() {
        assert!(matches!(
            address_from_response(&json!({"display_name": "somewhere"})),
            Err(ResolveError::Provider(_))
        ));
    }
}
