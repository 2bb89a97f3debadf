//! Reverse geocoding provider boundary.
//!
//! The pipeline only depends on [`Geocoder`]; [`NominatimGeocoder`] is the
//! production implementation over HTTP.

mod nominatim;

use std::future::Future;

use serde_json::Value;

use crate::error_handling::GeocodeError;

pub use nominatim::NominatimGeocoder;

/// A reverse geocoding provider.
///
/// Returns the provider's raw JSON response. Implementations must report a
/// timeout as [`GeocodeError::Timeout`] so the resolver can retry it, and every
/// other failure as [`GeocodeError::Provider`].
pub trait Geocoder {
    fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
        language: &str,
    ) -> impl Future<Output = Result<Value, GeocodeError>>;
}
