//! Nominatim reverse geocoding over HTTP.

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::Value;

use super::Geocoder;
use crate::error_handling::GeocodeError;

/// Reverse geocoder backed by a Nominatim `/reverse` endpoint.
#[derive(Clone)]
pub struct NominatimGeocoder {
    client: Arc<reqwest::Client>,
    base_url: String,
}

impl NominatimGeocoder {
    /// `client` should carry the request timeout and User-Agent
    /// (see [`crate::initialization::init_client`]).
    pub fn new(client: Arc<reqwest::Client>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl Geocoder for NominatimGeocoder {
    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> Result<Value, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("addressdetails", "1".to_string()),
                ("accept-language", language.to_string()),
            ])
            .send()
            .await
            .map_err(categorize_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(categorize_status(status));
        }

        let body: Value = response.json().await.map_err(categorize_reqwest_error)?;
        if let Some(message) = body.get("error") {
            let message = message
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| message.to_string());
            return Err(GeocodeError::Provider(message));
        }
        Ok(body)
    }
}

fn categorize_reqwest_error(error: reqwest::Error) -> GeocodeError {
    if error.is_timeout() {
        GeocodeError::Timeout
    } else {
        GeocodeError::Provider(error.to_string())
    }
}

/// 408 and 504 mean the provider gave up waiting; everything else is final.
fn categorize_status(status: StatusCode) -> GeocodeError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GeocodeError::Timeout,
        _ => GeocodeError::Provider(format!("HTTP {}", status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use httptest::{matchers::*, responders::*, Expectation, Server};

    fn geocoder(server: &Server, timeout: Duration) -> NominatimGeocoder {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("geo_searcher")
            .build()
            .expect("Failed to create client");
        NominatimGeocoder::new(Arc::new(client), server.url_str("/"))
    }

    #[tokio::test]
    async fn test_reverse_returns_raw_response() {
        let server = Server::run();
        server.expect(
            Expectation::matching(all_of![
                request::method_path("GET", "/reverse"),
                request::query(url_decoded(contains(("lat", "55.7558")))),
                request::query(url_decoded(contains(("lon", "37.6176")))),
                request::query(url_decoded(contains(("accept-language", "en")))),
            ])
            .respond_with(json_encoded(serde_json::json!({
                "place_id": 1,
                "address": {"city": "Moscow", "country": "Russia", "country_code": "ru"}
            }))),
        );

        let body = geocoder(&server, Duration::from_secs(5))
            .reverse(55.7558, 37.6176, "en")
            .await
            .expect("lookup should succeed");
        assert_eq!(body["address"]["city"], "Moscow");
    }

    #[tokio::test]
    async fn test_reverse_error_body_is_provider_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse"))
                .respond_with(json_encoded(serde_json::json!({"error": "Unable to geocode"}))),
        );

        let result = geocoder(&server, Duration::from_secs(5))
            .reverse(10.0, -30.0, "en")
            .await;
        assert_eq!(
            result,
            Err(GeocodeError::Provider("Unable to geocode".to_string()))
        );
    }

    #[tokio::test]
    async fn test_reverse_http_error_status() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse"))
                .respond_with(status_code(500)),
        );

        let result = geocoder(&server, Duration::from_secs(5))
            .reverse(1.0, 1.0, "en")
            .await;
        match result {
            Err(GeocodeError::Provider(msg)) => assert!(msg.contains("500"), "{msg}"),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reverse_gateway_timeout_is_timeout() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse"))
                .respond_with(status_code(504)),
        );

        let result = geocoder(&server, Duration::from_secs(5))
            .reverse(1.0, 1.0, "en")
            .await;
        assert_eq!(result, Err(GeocodeError::Timeout));
    }

    #[tokio::test]
    async fn test_reverse_slow_provider_is_timeout() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse")).respond_with(
                delay_and_then(
                    Duration::from_millis(500),
                    json_encoded(serde_json::json!({"address": {}})),
                ),
            ),
        );

        let result = geocoder(&server, Duration::from_millis(50))
            .reverse(1.0, 1.0, "en")
            .await;
        assert_eq!(result, Err(GeocodeError::Timeout));
    }

    #[tokio::test]
    async fn test_reverse_invalid_body_is_provider_error() {
        let server = Server::run();
        server.expect(
            Expectation::matching(request::method_path("GET", "/reverse"))
                .respond_with(status_code(200).body("<html>maintenance</html>")),
        );

        let result = geocoder(&server, Duration::from_secs(5))
            .reverse(1.0, 1.0, "en")
            .await;
        assert!(matches!(result, Err(GeocodeError::Provider(_))));
    }
}
