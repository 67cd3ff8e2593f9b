//! Datetime parsing and formatting for order windows.
//!
//! Clients send HTML `datetime-local` values (`2018-12-05T18:09` or
//! `2018-12-05T18:09:00`). Order windows are wall-clock times with no zone, so
//! values carrying an offset or `Z` are rejected rather than shifted into a
//! zone the other orders do not share. Anything else is rejected too.

use chrono::NaiveDateTime;

/// Output format for all datetimes on the wire.
pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Local datetime formats accepted on input, tried in order.
const LOCAL_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Errors that can occur when parsing a datetime.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DateTimeError {
    /// The input string is empty.
    #[error("datetime cannot be empty")]
    Empty,
    /// The input does not match any accepted format.
    #[error("invalid datetime '{0}', expected YYYY-MM-DDTHH:MM[:SS]")]
    Malformed(String),
}

/// Parse a datetime sent by a client.
///
/// # Errors
///
/// Returns an error if the input is empty or matches no accepted format.
///
/// ```
/// use rideshare_core::parse_datetime;
///
/// assert!(parse_datetime("2018-12-05T18:09").is_ok());
/// assert!(parse_datetime("2018-12-05T18:09:00").is_ok());
/// assert!(parse_datetime("2018-12-05T18:09:00Z").is_err());
/// assert!(parse_datetime("yesterday").is_err());
/// ```
pub fn parse_datetime(input: &str) -> Result<NaiveDateTime, DateTimeError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DateTimeError::Empty);
    }

    LOCAL_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| DateTimeError::Malformed(trimmed.to_owned()))
}

/// Format a datetime for the wire.
#[must_use]
pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(WIRE_FORMAT).to_string()
}

/// Serde adapter writing a [`NaiveDateTime`] in [`WIRE_FORMAT`].
pub(crate) mod wire {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(super::WIRE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_datetime(&raw).map_err(serde::de::Error::custom)
    }

    /// Same as the parent module, for optional values (`null` when absent).
    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)] // serde's `with` passes `&Option<T>`
        pub fn serialize<S: Serializer>(
            value: &Option<NaiveDateTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(v) => serializer.collect_str(&v.format(super::super::WIRE_FORMAT)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDateTime>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::super::parse_datetime(&raw).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Timelike};

    use super::*;

    #[test]
    fn test_parse_datetime_local_without_seconds() {
        let parsed = parse_datetime("2018-12-05T18:09").unwrap();
        let expected = NaiveDate::from_ymd_opt(2018, 12, 5)
            .unwrap()
            .and_hms_opt(18, 9, 0)
            .unwrap();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn test_parse_datetime_fractional_seconds() {
        let parsed = parse_datetime("2018-12-05T18:09:30.250").unwrap();
        assert_eq!(parsed.second(), 30);
    }

    #[test]
    fn test_parse_datetime_rejects_zoned_values() {
        for zoned in [
            "2018-12-05T18:09:00+01:00",
            "2018-12-05T18:09:00Z",
            "2018-12-05T18:09+02:00",
        ] {
            assert!(
                matches!(parse_datetime(zoned), Err(DateTimeError::Malformed(_))),
                "{zoned} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime("   "), Err(DateTimeError::Empty));
        assert!(matches!(
            parse_datetime("05/12/2018 18:09"),
            Err(DateTimeError::Malformed(_))
        ));
        assert!(parse_datetime("2018-13-05T18:09").is_err());
    }

    #[test]
    fn test_format_datetime_drops_fraction() {
        let parsed = parse_datetime("2018-12-05T18:09:30.999").unwrap();
        assert_eq!(format_datetime(&parsed), "2018-12-05T18:09:30");
    }
}
