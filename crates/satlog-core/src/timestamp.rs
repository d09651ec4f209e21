//! Bracketed log timestamp parsing.

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

/// Accepted timestamp layouts, tried in order.
///
/// The first two are the Unreal engine format written by the dedicated server
/// (`2025.07.27-11.10.42:986`), with and without the millisecond suffix.
const FORMATS: &[&str] = &[
    "%Y.%m.%d-%H.%M.%S:%3f",
    "%Y.%m.%d-%H.%M.%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// A matched line whose timestamp could not be read.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimestampParseError {
    #[error("line has no bracketed timestamp prefix")]
    Missing,
    #[error("unrecognized timestamp `{0}`")]
    Invalid(String),
}

/// Parses the bracketed timestamp at the start of a log line.
///
/// Log timestamps carry no zone; they are read as UTC.
pub fn parse_line_timestamp(line: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let rest = line
        .trim_start()
        .strip_prefix('[')
        .ok_or(TimestampParseError::Missing)?;
    let (raw, _) = rest.split_once(']').ok_or(TimestampParseError::Missing)?;
    parse_timestamp(raw.trim())
}

/// Parses a bare timestamp string in any of the accepted formats.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| TimestampParseError::Invalid(raw.to_string()))
}
