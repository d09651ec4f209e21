//! Typed events extracted from server log lines.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recognized log line.
///
/// `timestamp` is `None` when the line matched a rule but its timestamp could
/// not be parsed. Such events still count toward totals but are left out of
/// anything bucketed by time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: Option<DateTime<Utc>>,
    pub kind: EventKind,
    /// File name (not full path) the line came from.
    pub source_file: String,
    /// 1-based line number within `source_file`.
    pub line_number: u64,
    pub raw_line: String,
}

/// What a log line means.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Join {
        player: String,
    },
    Leave {
        player: String,
    },
    Error {
        message: String,
    },
    Warning {
        message: String,
    },
    ConnectionAttempt {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ip: Option<String>,
        outcome: ConnectionOutcome,
    },
    ServerStart,
    ServerStop,
}

impl EventKind {
    /// Whether this event counts toward the error total.
    pub const fn is_problem(&self) -> bool {
        matches!(self, Self::Error { .. } | Self::Warning { .. })
    }

    /// Short label used in logs and the report.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Leave { .. } => "leave",
            Self::Error { .. } => "error",
            Self::Warning { .. } => "warning",
            Self::ConnectionAttempt { .. } => "connection_attempt",
            Self::ServerStart => "server_start",
            Self::ServerStop => "server_stop",
        }
    }
}

/// Whether the server accepted an incoming connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionOutcome {
    Accepted,
    Rejected,
}

impl fmt::Display for ConnectionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => f.write_str("accepted"),
            Self::Rejected => f.write_str("rejected"),
        }
    }
}
