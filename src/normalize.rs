//! Projection of a raw address mapping onto a [`PlaceRecord`].
//!
//! This is a structural projection only: values are copied as-is, without
//! trimming or case changes. Optional keys missing from the mapping stay `None`.

use crate::error_handling::ValidationError;
use crate::models::{PlaceField, PlaceRecord, RawPlace};

/// Builds a [`PlaceRecord`] from `raw`.
///
/// Fails on the first absent required key (`country`, `country_code`, `iso`, in
/// that order). A present but empty value is accepted.
pub fn normalize(raw: &RawPlace) -> Result<PlaceRecord, ValidationError> {
    Ok(PlaceRecord {
        region: optional(raw, PlaceField::Region),
        state: optional(raw, PlaceField::State),
        country: required(raw, PlaceField::Country)?,
        country_code: required(raw, PlaceField::CountryCode)?,
        iso: required(raw, PlaceField::Iso)?,
        city: optional(raw, PlaceField::City),
    })
}

fn optional(raw: &RawPlace, field: PlaceField) -> Option<String> {
    raw.get(field.as_str()).map(str::to_string)
}

fn required(raw: &RawPlace, field: PlaceField) -> Result<String, ValidationError> {
    optional(raw, field).ok_or(ValidationError::MissingField(field.as_str()))
}
