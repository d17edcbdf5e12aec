use chrono::{DateTime, NaiveDate};

/// Date format used wherever a calendar date leaves the process (store, exports).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Encodes a calendar date as an ISO-8601 date string (`2024-01-08`).
pub fn encode_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Decodes a date written by [`encode_date`].
///
/// Full RFC 3339 timestamps (`2024-01-08T00:00:00.000Z`) are also accepted and
/// truncated to their calendar date, so records written with timestamps still load.
pub fn decode_date(s: &str) -> Result<NaiveDate, String> {
    let s = s.trim();
    if let Ok(d) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        return Ok(d);
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.date_naive())
        .map_err(|e| format!("invalid date '{}': {}", s, e))
}
