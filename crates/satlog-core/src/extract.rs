//! Line classification.
//!
//! Each line is tested against an ordered list of rules; the first rule whose
//! pattern matches builds the event. Lines matching nothing are dropped.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::event::{ConnectionOutcome, EventKind, LogEvent};
use crate::timestamp::parse_line_timestamp;

/// Maximum length of a captured error/warning message, in characters.
pub const MAX_MESSAGE_LEN: usize = 200;

static JOIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bJoin(?: succeeded)?:\s*(?P<player>\S(?:.*\S)?)\s*$").unwrap()
});

static LEAVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:Leave|Logout|Player disconnected):\s*(?P<player>\S(?:.*\S)?)\s*$").unwrap()
});

// Unanchored so compound tokens such as `LoadError:` still count.
static ERROR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Error:").unwrap());

static WARNING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Warning:|UNetConnection::Close").unwrap());

static ACCEPTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"NotifyAcceptingConnection accepted from:(?:\s*\[(?P<ip>[^\]]+)\])?").unwrap()
});

static REJECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bconnection (?:attempt )?(?:failed|refused|rejected)\b").unwrap()
});

static IPV4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{1,3}(?:\.\d{1,3}){3}(?::\d{1,5})?\b").unwrap());

static START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Log file open|Engine is initialized|Server started").unwrap()
});

static STOP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Log file closed|LogExit: Exiting|Server stopped").unwrap());

/// A pattern paired with the constructor for the event it recognizes.
struct Rule {
    pattern: &'static LazyLock<Regex>,
    build: fn(&Captures<'_>, &str) -> EventKind,
}

/// Rules in priority order.
static RULES: [Rule; 8] = [
    Rule {
        pattern: &JOIN_RE,
        build: |caps, _| EventKind::Join {
            player: caps["player"].to_string(),
        },
    },
    Rule {
        pattern: &LEAVE_RE,
        build: |caps, _| EventKind::Leave {
            player: caps["player"].to_string(),
        },
    },
    Rule {
        pattern: &ERROR_RE,
        build: |_, line| EventKind::Error {
            message: truncate_message(line),
        },
    },
    Rule {
        pattern: &WARNING_RE,
        build: |_, line| EventKind::Warning {
            message: truncate_message(line),
        },
    },
    Rule {
        pattern: &ACCEPTED_RE,
        build: |caps, _| EventKind::ConnectionAttempt {
            ip: caps.name("ip").map(|m| m.as_str().trim().to_string()),
            outcome: ConnectionOutcome::Accepted,
        },
    },
    Rule {
        pattern: &REJECTED_RE,
        build: |_, line| EventKind::ConnectionAttempt {
            ip: IPV4_RE.find(line).map(|m| m.as_str().to_string()),
            outcome: ConnectionOutcome::Rejected,
        },
    },
    Rule {
        pattern: &START_RE,
        build: |_, _| EventKind::ServerStart,
    },
    Rule {
        pattern: &STOP_RE,
        build: |_, _| EventKind::ServerStop,
    },
];

/// Classifies a line without looking at its timestamp.
pub fn classify_line(line: &str) -> Option<EventKind> {
    RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(line)
            .map(|caps| (rule.build)(&caps, line))
    })
}

/// Turns a raw log line into an event, if any rule recognizes it.
///
/// A recognized line with an unreadable timestamp is kept with
/// `timestamp: None`.
pub fn extract_event(source_file: &str, line_number: u64, line: &str) -> Option<LogEvent> {
    let kind = classify_line(line)?;

    let timestamp = match parse_line_timestamp(line) {
        Ok(ts) => Some(ts),
        Err(e) => {
            tracing::debug!(
                file = source_file,
                line = line_number,
                raw = line,
                kind = kind.label(),
                error = %e,
                "keeping event with unknown timestamp"
            );
            None
        }
    };

    Some(LogEvent {
        timestamp,
        kind,
        source_file: source_file.to_string(),
        line_number,
        raw_line: line.to_string(),
    })
}

fn truncate_message(line: &str) -> String {
    line.trim().chars().take(MAX_MESSAGE_LEN).collect()
}
