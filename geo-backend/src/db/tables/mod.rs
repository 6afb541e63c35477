pub mod accounts;
pub mod api_calls;
pub mod articles;
pub mod keywords;
pub mod settings;
pub mod verifications;
pub mod workflows;

use chrono::{DateTime, Utc};

/// Parse a stored RFC 3339 timestamp, falling back to now for rows written
/// by hand or by older builds
pub(crate) fn parse_ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
