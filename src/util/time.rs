//! Parsing of user-supplied timestamps.

use crate::error::{Result, TicketError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Parse a timestamp given on the command line.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS` (read as
/// UTC) and a bare `YYYY-MM-DD` (midnight UTC).
///
/// # Errors
///
/// Returns a validation error naming `field` if no format matches.
pub fn parse_timestamp(field: &str, input: &str) -> Result<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&naive));
        }
    }

    Err(TicketError::validation(
        field,
        format!("unrecognised timestamp '{s}' (use RFC 3339 or YYYY-MM-DD)"),
    ))
}
