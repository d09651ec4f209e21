//! Report schema and emission.
//!
//! The dashboard reads this document directly, so field names and nesting are
//! part of the contract. Maps are `BTreeMap`s so key order is stable and two
//! runs over the same logs differ only in `generated_at`.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::event::ConnectionOutcome;
use crate::session::PlayerSession;

/// Bumped only on incompatible schema changes.
pub const REPORT_SCHEMA_VERSION: u32 = 1;

/// Top-level aggregate written for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub summary: Summary,
    /// Join events per calendar day (UTC).
    pub daily_activity: BTreeMap<NaiveDate, u64>,
    pub players: BTreeMap<String, PlayerStats>,
    pub sessions: Vec<PlayerSession>,
    pub uptime_windows: Vec<UptimeWindow>,
    pub logging_gaps: Vec<LoggingGap>,
    /// Newest first.
    pub recent_errors: Vec<ErrorRecord>,
    /// Newest first.
    pub recent_connections: Vec<ConnectionRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Every discovered file, including the skipped ones.
    pub total_log_files: u64,
    /// Files that could not be read.
    pub skipped_log_files: u64,
    pub total_unique_players: u64,
    pub total_join_events: u64,
    pub total_sessions: u64,
    /// Errors and warnings together.
    pub total_errors: u64,
    pub total_connections: u64,
    pub total_events: u64,
    pub unknown_timestamp_events: u64,
    /// Distinct days with at least one timestamped event.
    pub active_days: u64,
    pub first_activity: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub server_span_days: i64,
    pub total_logging_gaps: u64,
    pub longest_gap_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub join_count: u64,
    pub session_count: u64,
    pub total_playtime_seconds: i64,
    pub first_seen: Option<DateTime<Utc>>,
    pub last_seen: Option<DateTime<Utc>>,
    pub average_session_seconds: i64,
    pub min_session_seconds: i64,
    pub max_session_seconds: i64,
}

/// A contiguous interval during which the server was running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UptimeWindow {
    pub source_file: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
}

/// A stretch between two uptime windows not covered by any log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingGap {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_seconds: i64,
    pub after_file: String,
    pub before_file: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProblemLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub level: ProblemLevel,
    pub message: String,
    pub source_file: String,
    pub line_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionRecord {
    pub timestamp: Option<DateTime<Utc>>,
    pub ip: Option<String>,
    pub outcome: ConnectionOutcome,
    pub source_file: String,
    pub line_number: u64,
}

impl MetricsReport {
    /// Pretty-printed JSON, as written to disk.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Writes the report to `path`, replacing any previous report only once
    /// the new one is fully on disk.
    pub fn write_to(&self, path: &Path) -> Result<(), Error> {
        let json = self.to_json()?;
        let write_err = |source: std::io::Error| Error::ReportWrite {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(json.as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;
        tmp.persist(path).map_err(|e| write_err(e.error))?;

        tracing::info!(path = %path.display(), bytes = json.len(), "wrote metrics report");
        Ok(())
    }
}
