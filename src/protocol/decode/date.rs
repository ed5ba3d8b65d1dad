//! Date/time coercion for text cells.
//!
//! The bridge service renders temporal values as JSON strings. Depending on
//! the engine type and the service's JSON encoder these arrive as:
//! - RFC 3339 (`2024-10-21T12:36:05Z`, `2024-10-21T12:36:05+02:00`)
//! - ISO-like local timestamps (`2024-10-21 12:36:05.123`, `2024-10-21T12:36:05`)
//! - plain dates (`2024-10-21`, midnight is assumed)
//! - HTTP dates (`Mon, 21 Oct 2024 12:36:05 GMT`)

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

const LOCAL_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// Parse a timestamp from cell text.
///
/// Offset-carrying forms are converted to UTC.
pub fn parse_datetime(text: &str) -> Result<NaiveDateTime> {
    let trimmed = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_utc());
    }
    for format in LOCAL_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(NaiveDateTime::new(date, NaiveTime::MIN));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(dt.naive_utc());
    }

    Err(Error::type_coercion(format!(
        "cannot convert '{}' to DateTime",
        text
    )))
}
