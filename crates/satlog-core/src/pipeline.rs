//! End-to-end pass: files → events → sessions → report.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::Error;
use crate::event::LogEvent;
use crate::extract::extract_event;
use crate::metrics::{MetricsAggregator, MetricsConfig};
use crate::reader::{LogLines, discover_log_files, open_log, source_name};
use crate::report::MetricsReport;
use crate::session::reconstruct_sessions;

/// Discovers logs in `dir` and analyzes them.
///
/// Fails if no file matches; unreadable files are logged and skipped.
pub fn analyze_dir(
    dir: &Path,
    pattern: &str,
    config: &MetricsConfig,
    generated_at: DateTime<Utc>,
) -> Result<MetricsReport, Error> {
    let files = discover_log_files(dir, pattern)?;
    analyze_files(&files, config, generated_at)
}

/// Analyzes the given files in order, one at a time.
///
/// Recoverable read errors skip the file; anything else aborts the run.
pub fn analyze_files(
    files: &[PathBuf],
    config: &MetricsConfig,
    generated_at: DateTime<Utc>,
) -> Result<MetricsReport, Error> {
    let mut aggregator = MetricsAggregator::new(config.clone());

    for path in files {
        let source = source_name(path);
        let events = match read_events(path, &source) {
            Ok(events) => events,
            Err(e) if e.is_recoverable() => {
                tracing::warn!(file = %path.display(), error = %e, "skipping log file");
                aggregator.record_skipped_file();
                continue;
            }
            Err(e) => return Err(e),
        };

        let file_index = aggregator.begin_file(&source);
        for event in &events {
            aggregator.observe_event(file_index, event);
        }

        let sessions = reconstruct_sessions(&source, &events);
        tracing::info!(
            file = %source,
            events = events.len(),
            sessions = sessions.len(),
            "analyzed log file"
        );
        for session in sessions {
            aggregator.observe_session(session);
        }
    }

    Ok(aggregator.finish(generated_at))
}

/// Reads and classifies every line of one file.
///
/// A read failure part way through discards the whole file so that a
/// truncated read never produces misleading sessions.
pub fn read_events(path: &Path, source_file: &str) -> Result<Vec<LogEvent>, Error> {
    collect_events(path, source_file, open_log(path)?)
}

fn collect_events<R: BufRead>(
    path: &Path,
    source_file: &str,
    lines: LogLines<R>,
) -> Result<Vec<LogEvent>, Error> {
    let mut events = Vec::new();
    let mut last_line = 0;

    for line in lines {
        let line = line.map_err(|source| Error::ReadInterrupted {
            path: path.to_path_buf(),
            line_number: last_line,
            source,
        })?;
        last_line = line.line_number;
        if let Some(event) = extract_event(source_file, line.line_number, &line.text) {
            events.push(event);
        }
    }

    Ok(events)
}
