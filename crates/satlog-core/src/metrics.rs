//! Folds events and sessions into a [`MetricsReport`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::event::{EventKind, LogEvent};
use crate::recent::{RecencyKey, RecentBuffer};
use crate::report::{
    ConnectionRecord, ErrorRecord, LoggingGap, MetricsReport, PlayerStats, ProblemLevel,
    REPORT_SCHEMA_VERSION, Summary, UptimeWindow,
};
use crate::session::PlayerSession;

/// Tuning knobs for aggregation.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// How many errors/warnings to keep. Default: 50.
    pub recent_errors_limit: usize,
    /// How many connection attempts to keep. Default: 50.
    pub recent_connections_limit: usize,
    /// Gaps between uptime windows longer than this are reported.
    /// Default: 1 hour.
    pub gap_threshold: Duration,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            recent_errors_limit: 50,
            recent_connections_limit: 50,
            gap_threshold: Duration::hours(1),
        }
    }
}

/// Timestamp bounds seen in one file, used to derive its uptime window.
#[derive(Debug, Default)]
struct FileSpan {
    source_file: String,
    first_event: Option<DateTime<Utc>>,
    last_event: Option<DateTime<Utc>>,
    first_start: Option<DateTime<Utc>>,
    last_stop: Option<DateTime<Utc>>,
}

impl FileSpan {
    fn observe(&mut self, ts: DateTime<Utc>, kind: &EventKind) {
        self.first_event = Some(self.first_event.map_or(ts, |t| t.min(ts)));
        self.last_event = Some(self.last_event.map_or(ts, |t| t.max(ts)));
        match kind {
            EventKind::ServerStart => {
                self.first_start = Some(self.first_start.map_or(ts, |t| t.min(ts)));
            }
            EventKind::ServerStop => {
                self.last_stop = Some(self.last_stop.map_or(ts, |t| t.max(ts)));
            }
            _ => {}
        }
    }

    fn window(&self) -> Option<UptimeWindow> {
        let start = self.first_start.or(self.first_event)?;
        let end = self.last_stop.or(self.last_event)?.max(start);
        Some(UptimeWindow {
            source_file: self.source_file.clone(),
            start_time: start,
            end_time: end,
            duration_seconds: (end - start).num_seconds(),
        })
    }
}

/// Join-derived facts about one player.
#[derive(Debug, Default)]
struct JoinTally {
    count: u64,
    first_seen: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
}

/// Single-pass accumulator.
///
/// Call [`begin_file`](Self::begin_file) for each successfully read file, then
/// feed that file's events and sessions. Counters are order-independent;
/// only the recent lists depend on the file index for tie-breaking.
#[derive(Debug)]
pub struct MetricsAggregator {
    config: MetricsConfig,
    files: Vec<FileSpan>,
    skipped_files: u64,
    total_events: u64,
    join_events: u64,
    problem_events: u64,
    connection_events: u64,
    unknown_timestamp_events: u64,
    active_days: BTreeSet<NaiveDate>,
    daily_joins: BTreeMap<NaiveDate, u64>,
    joins: BTreeMap<String, JoinTally>,
    sessions: Vec<PlayerSession>,
    recent_errors: RecentBuffer<ErrorRecord>,
    recent_connections: RecentBuffer<ConnectionRecord>,
}

impl MetricsAggregator {
    pub fn new(config: MetricsConfig) -> Self {
        let recent_errors = RecentBuffer::new(config.recent_errors_limit);
        let recent_connections = RecentBuffer::new(config.recent_connections_limit);
        Self {
            config,
            files: Vec::new(),
            skipped_files: 0,
            total_events: 0,
            join_events: 0,
            problem_events: 0,
            connection_events: 0,
            unknown_timestamp_events: 0,
            active_days: BTreeSet::new(),
            daily_joins: BTreeMap::new(),
            joins: BTreeMap::new(),
            sessions: Vec::new(),
            recent_errors,
            recent_connections,
        }
    }

    /// Registers a file and returns its index for [`observe_event`](Self::observe_event).
    pub fn begin_file(&mut self, source_file: &str) -> usize {
        self.files.push(FileSpan {
            source_file: source_file.to_string(),
            ..FileSpan::default()
        });
        self.files.len() - 1
    }

    /// Counts a file that could not be read.
    pub fn record_skipped_file(&mut self) {
        self.skipped_files += 1;
    }

    pub fn observe_event(&mut self, file_index: usize, event: &LogEvent) {
        self.total_events += 1;

        match event.timestamp {
            Some(ts) => {
                self.active_days.insert(ts.date_naive());
                if let Some(span) = self.files.get_mut(file_index) {
                    span.observe(ts, &event.kind);
                }
            }
            None => self.unknown_timestamp_events += 1,
        }

        if event.kind.is_problem() {
            self.problem_events += 1;
        }

        let key = RecencyKey::new(event.timestamp, file_index, event.line_number);

        match &event.kind {
            EventKind::Join { player } => {
                self.join_events += 1;
                if let Some(ts) = event.timestamp {
                    *self.daily_joins.entry(ts.date_naive()).or_default() += 1;
                }
                let tally = self.joins.entry(player.clone()).or_default();
                tally.count += 1;
                if let Some(ts) = event.timestamp {
                    tally.first_seen = Some(tally.first_seen.map_or(ts, |t| t.min(ts)));
                    tally.last_seen = Some(tally.last_seen.map_or(ts, |t| t.max(ts)));
                }
            }
            EventKind::Error { message } | EventKind::Warning { message } => {
                let level = if matches!(event.kind, EventKind::Error { .. }) {
                    ProblemLevel::Error
                } else {
                    ProblemLevel::Warning
                };
                self.recent_errors.push(
                    key,
                    ErrorRecord {
                        timestamp: event.timestamp,
                        level,
                        message: message.clone(),
                        source_file: event.source_file.clone(),
                        line_number: event.line_number,
                    },
                );
            }
            EventKind::ConnectionAttempt { ip, outcome } => {
                self.connection_events += 1;
                self.recent_connections.push(
                    key,
                    ConnectionRecord {
                        timestamp: event.timestamp,
                        ip: ip.clone(),
                        outcome: *outcome,
                        source_file: event.source_file.clone(),
                        line_number: event.line_number,
                    },
                );
            }
            EventKind::Leave { .. } | EventKind::ServerStart | EventKind::ServerStop => {}
        }
    }

    pub fn observe_session(&mut self, session: PlayerSession) {
        self.sessions.push(session);
    }

    /// Produces the final report.
    pub fn finish(self, generated_at: DateTime<Utc>) -> MetricsReport {
        let players = build_player_stats(&self.joins, &self.sessions);

        // One window per file, in file order.
        let uptime_windows: Vec<UptimeWindow> =
            self.files.iter().filter_map(FileSpan::window).collect();
        let logging_gaps = find_logging_gaps(&uptime_windows, self.config.gap_threshold);

        let first_activity = self.files.iter().filter_map(|f| f.first_event).min();
        let last_activity = self.files.iter().filter_map(|f| f.last_event).max();
        let server_span_days = match (first_activity, last_activity) {
            (Some(first), Some(last)) => (last - first).num_days(),
            _ => 0,
        };

        let summary = Summary {
            total_log_files: self.files.len() as u64 + self.skipped_files,
            skipped_log_files: self.skipped_files,
            total_unique_players: players.len() as u64,
            total_join_events: self.join_events,
            total_sessions: self.sessions.len() as u64,
            total_errors: self.problem_events,
            total_connections: self.connection_events,
            total_events: self.total_events,
            unknown_timestamp_events: self.unknown_timestamp_events,
            active_days: self.active_days.len() as u64,
            first_activity,
            last_activity,
            server_span_days,
            total_logging_gaps: logging_gaps.len() as u64,
            longest_gap_seconds: logging_gaps
                .iter()
                .map(|g| g.duration_seconds)
                .max()
                .unwrap_or(0),
        };

        MetricsReport {
            schema_version: REPORT_SCHEMA_VERSION,
            generated_at,
            summary,
            daily_activity: self.daily_joins,
            players,
            sessions: self.sessions,
            uptime_windows,
            logging_gaps,
            recent_errors: self.recent_errors.into_vec(),
            recent_connections: self.recent_connections.into_vec(),
        }
    }
}

/// Groups sessions by player; join counts come from join events so players
/// whose joins had no usable timestamp still appear.
fn build_player_stats(
    joins: &BTreeMap<String, JoinTally>,
    sessions: &[PlayerSession],
) -> BTreeMap<String, PlayerStats> {
    let mut players: BTreeMap<String, PlayerStats> = joins
        .iter()
        .map(|(name, tally)| {
            (
                name.clone(),
                PlayerStats {
                    join_count: tally.count,
                    first_seen: tally.first_seen,
                    last_seen: tally.last_seen,
                    ..PlayerStats::default()
                },
            )
        })
        .collect();

    for session in sessions {
        let stats = players.entry(session.player.clone()).or_default();
        let duration = session.duration_seconds;
        stats.min_session_seconds = if stats.session_count == 0 {
            duration
        } else {
            stats.min_session_seconds.min(duration)
        };
        stats.max_session_seconds = stats.max_session_seconds.max(duration);
        stats.session_count += 1;
        stats.total_playtime_seconds += duration;
    }

    for stats in players.values_mut() {
        if stats.session_count > 0 {
            let count = i64::try_from(stats.session_count).unwrap_or(i64::MAX);
            stats.average_session_seconds = stats.total_playtime_seconds / count;
        }
    }

    players
}

/// Walks windows by start time, measuring each gap from the latest end seen
/// so far so that a window nested inside a longer one never opens a gap.
fn find_logging_gaps(windows: &[UptimeWindow], threshold: Duration) -> Vec<LoggingGap> {
    let mut ordered: Vec<&UptimeWindow> = windows.iter().collect();
    ordered.sort_by_key(|w| (w.start_time, w.end_time));

    let mut gaps = Vec::new();
    let Some((first, rest)) = ordered.split_first() else {
        return gaps;
    };

    let mut covered_until = *first;
    for window in rest {
        let gap = window.start_time - covered_until.end_time;
        if gap > threshold {
            gaps.push(LoggingGap {
                start: covered_until.end_time,
                end: window.start_time,
                duration_seconds: gap.num_seconds(),
                after_file: covered_until.source_file.clone(),
                before_file: window.source_file.clone(),
            });
        }
        if window.end_time > covered_until.end_time {
            covered_until = *window;
        }
    }

    gaps
}
