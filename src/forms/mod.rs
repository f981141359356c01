//! Validated inputs parsed from incoming HTTP requests.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::domain::course::parse_date_time;

pub mod search;

/// Parses an optional query-string value, treating an empty value as absent.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Same as [`empty_as_none`] for amounts; `NaN` and infinities are rejected.
pub(crate) fn optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match empty_as_none::<D, f64>(deserializer)? {
        Some(value) if !value.is_finite() => Err(serde::de::Error::custom(format!(
            "expected a finite number, got {value}"
        ))),
        amount => Ok(amount),
    }
}

/// Same as [`empty_as_none`] for ISO-8601 date-times.
pub(crate) fn optional_date_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date_time(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
