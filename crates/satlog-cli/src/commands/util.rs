//! Shared utilities for CLI commands.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;

use satlog_core::{MetricsReport, analyze_dir};

use crate::Config;

/// Runs the full pipeline over `dir`, falling back to the configured log dir.
pub fn build_report(config: &Config, dir: Option<&Path>) -> Result<MetricsReport> {
    let dir = dir.unwrap_or(&config.log_dir);
    analyze_dir(dir, &config.log_pattern, &config.metrics_config(), Utc::now())
        .with_context(|| format!("failed to analyze logs in {}", dir.display()))
}

/// Formats seconds as duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(seconds: i64) -> String {
    if seconds < 0 {
        return "0m".to_string();
    }

    let total_minutes = seconds / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
