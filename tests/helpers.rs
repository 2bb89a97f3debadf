// Shared test helpers for the integration tests.
//
// Provides an in-process queue double and a mock Nominatim server so the
// pipeline can be exercised without a broker or network access.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use geo_searcher::error_handling::QueueError;
use geo_searcher::queue::MessageSource;
use httptest::{matchers::*, responders::*, Expectation, Server};

/// Queue double that yields its payloads and then either closes or waits forever.
pub struct VecSource {
    payloads: VecDeque<Vec<u8>>,
    hang_when_empty: bool,
    stops: Arc<AtomicUsize>,
}

#[allow(dead_code)] // Not every test file uses every helper
impl VecSource {
    pub fn closing(payloads: &[&str]) -> Self {
        Self::new(payloads, false)
    }

    pub fn hanging(payloads: &[&str]) -> Self {
        Self::new(payloads, true)
    }

    fn new(payloads: &[&str], hang_when_empty: bool) -> Self {
        Self {
            payloads: payloads.iter().map(|p| p.as_bytes().to_vec()).collect(),
            hang_when_empty,
            stops: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn stop_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.stops)
    }
}

impl MessageSource for VecSource {
    async fn start(&mut self) -> Result<(), QueueError> {
        Ok(())
    }

    async fn next_record(&mut self) -> Option<Result<Vec<u8>, QueueError>> {
        match self.payloads.pop_front() {
            Some(payload) => Some(Ok(payload)),
            None if self.hang_when_empty => std::future::pending().await,
            None => None,
        }
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Stop calls observed so far.
#[allow(dead_code)]
pub fn stops(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Nominatim response for the Kremlin.
pub fn moscow_response() -> serde_json::Value {
    serde_json::json!({
        "place_id": 1,
        "lat": "55.7558",
        "lon": "37.6176",
        "display_name": "Kremlin and Red Square, Moscow, Russia",
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

/// Mock Nominatim answering Moscow for its coordinates and an error otherwise.
#[allow(dead_code)]
pub fn mock_nominatim() -> Server {
    let server = Server::run();
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/reverse"),
            request::query(url_decoded(contains(("lat", "55.7558")))),
            request::query(url_decoded(contains(("lon", "37.6176")))),
        ])
        .times(..)
        .respond_with(json_encoded(moscow_response())),
    );
    server.expect(
        Expectation::matching(all_of![
            request::method_path("GET", "/reverse"),
            request::query(url_decoded(not(contains(("lat", "55.7558"))))),
        ])
        .times(..)
        .respond_with(json_encoded(
            serde_json::json!({"error": "Unable to geocode"}),
        )),
    );
    server
}
