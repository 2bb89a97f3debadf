//! Data carried through the ingestion pipeline.
//!
//! A queue record decodes into a [`CoordinateMessage`], the geocoder's answer is
//! flattened into a [`RawPlace`], and normalization projects that into the
//! [`PlaceRecord`] that is finally stored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error_handling::DecodeError;

/// Latitude/longitude pair carried by one queue record.
///
/// Wire format is a JSON object with numeric `lat` and `long` fields. Both are
/// required; any other fields the producer adds (altitude, timestamp) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CoordinateMessage {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "long")]
    pub longitude: f64,
}

impl CoordinateMessage {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Decodes a UTF-8 JSON queue payload.
    pub fn decode(payload: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(payload)?;
        Ok(serde_json::from_str(text)?)
    }

    /// `(0.0, 0.0)` is what producers send when a photo carries no GPS data.
    pub fn is_empty(&self) -> bool {
        self.latitude == 0.0 && self.longitude == 0.0
    }
}

/// Flat address-component mapping returned by the geocoder (`city` -> `Moscow`).
///
/// Lives only for the duration of a single resolve/normalize step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawPlace(BTreeMap<String, String>);

impl RawPlace {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RawPlace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// A resolved place ready for storage.
///
/// `country`, `country_code` and `iso` are always present. The optional fields
/// stay `None` when the geocoder did not report them and are stored as NULL,
/// never as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub region: Option<String>,
    pub state: Option<String>,
    pub country: String,
    pub country_code: String,
    pub iso: String,
    pub city: Option<String>,
}

/// Document keys a stored place can be looked up by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceField {
    Region,
    State,
    Country,
    CountryCode,
    Iso,
    City,
}

impl PlaceField {
    /// Column/document key name as stored.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceField::Region => "region",
            PlaceField::State => "state",
            PlaceField::Country => "country",
            PlaceField::CountryCode => "country_code",
            PlaceField::Iso => "iso",
            PlaceField::City => "city",
        }
    }
}

impl std::fmt::Display for PlaceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_coordinate_message() {
        let msg = CoordinateMessage::decode(br#"{"lat": 55.7558, "long": 37.6176}"#)
            .expect("valid payload should decode");
        assert_eq!(msg.latitude, 55.7558);
        assert_eq!(msg.longitude, 37.6176);
    }

    #[test]
    fn test_decode_ignores_extra_producer_fields() {
        let payload =
            br#"{"lat": 45.043938, "long": 39.032085, "altitude": 27.813, "tmstmp": "2021-01-04T14:49:57+00:00"}"#;
        let msg = CoordinateMessage::decode(payload).expect("extra fields are ignored");
        assert_eq!(msg, CoordinateMessage::new(45.043938, 39.032085));
    }

    #[test]
    fn test_decode_requires_both_fields() {
        assert!(matches!(
            CoordinateMessage::decode(br#"{"lat": 1.0}"#),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            CoordinateMessage::decode(br#"{"long": 1.0}"#),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_numeric_and_non_utf8() {
        assert!(matches!(
            CoordinateMessage::decode(br#"{"lat": "north", "long": 1.0}"#),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            CoordinateMessage::decode(&[0xff, 0xfe, 0x00]),
            Err(DecodeError::Utf8(_))
        ));
    }

    #[test]
    fn test_is_empty_only_for_origin() {
        assert!(CoordinateMessage::new(0.0, 0.0).is_empty());
        assert!(!CoordinateMessage::new(0.0, 12.5).is_empty());
        assert!(!CoordinateMessage::new(51.1657, 0.0).is_empty());
    }

    #[test]
    fn test_raw_place_collects_pairs() {
        let raw: RawPlace = [("city", "Paris"), ("country", "France")]
            .into_iter()
            .collect();
        assert_eq!(raw.get("city"), Some("Paris"));
        assert_eq!(raw.len(), 2);
        assert!(!raw.contains_key("state"));
    }

    #[test]
    fn test_place_record_serializes_absent_fields_as_null() {
        let record = PlaceRecord {
            region: None,
            state: None,
            country: "Kazakhstan".to_string(),
            country_code: "kz".to_string(),
            iso: "KZ-71".to_string(),
            city: Some("Astana".to_string()),
        };
        let json = serde_json::to_value(&record).expect("record serializes");
        assert!(json["region"].is_null());
        assert_eq!(json["country_code"], "kz");
    }
}
