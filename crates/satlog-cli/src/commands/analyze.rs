//! Analyze command: run the pipeline and write the dashboard report.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use satlog_core::Summary;

use super::util::{build_report, format_duration};
use crate::Config;

pub fn run<W: Write>(
    writer: &mut W,
    config: &Config,
    dir: Option<&Path>,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let report = build_report(config, dir)?;

    let output = output.unwrap_or(&config.output_path);
    report
        .write_to(output)
        .with_context(|| format!("failed to save metrics to {}", output.display()))?;

    if json {
        write!(writer, "{}", report.to_json()?)?;
    } else {
        write_summary(writer, &report.summary)?;
        writeln!(writer, "Metrics saved to {}", output.display())?;
    }

    Ok(())
}

/// Writes the human-readable run summary.
pub fn write_summary<W: Write>(writer: &mut W, summary: &Summary) -> Result<()> {
    writeln!(writer, "=== Satisfactory Server Analysis ===")?;
    if summary.skipped_log_files > 0 {
        writeln!(
            writer,
            "Log files analyzed: {} ({} skipped)",
            summary.total_log_files, summary.skipped_log_files
        )?;
    } else {
        writeln!(writer, "Log files analyzed: {}", summary.total_log_files)?;
    }
    writeln!(writer, "Unique players: {}", summary.total_unique_players)?;
    writeln!(writer, "Total join events: {}", summary.total_join_events)?;
    writeln!(writer, "Total sessions: {}", summary.total_sessions)?;
    writeln!(writer, "Server active span: {} days", summary.server_span_days)?;
    writeln!(writer, "Total errors logged: {}", summary.total_errors)?;
    if summary.total_logging_gaps > 0 {
        writeln!(
            writer,
            "Logging gaps: {} (longest {})",
            summary.total_logging_gaps,
            format_duration(summary.longest_gap_seconds)
        )?;
    } else {
        writeln!(writer, "Logging gaps: 0")?;
    }
    Ok(())
}
