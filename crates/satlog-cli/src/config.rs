//! Configuration loading and management.

use std::path::{Path, PathBuf};

use chrono::Duration;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use satlog_core::{DEFAULT_LOG_PATTERN, MetricsConfig};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for server logs.
    pub log_dir: PathBuf,
    /// Glob matched against file names in `log_dir`.
    pub log_pattern: String,
    /// Where the dashboard report is written.
    pub output_path: PathBuf,
    pub recent_errors_limit: usize,
    pub recent_connections_limit: usize,
    /// Minimum uncovered stretch between log files to report as a gap.
    pub gap_threshold_minutes: i64,
}

impl Default for Config {
    fn default() -> Self {
        let metrics = MetricsConfig::default();
        Self {
            log_dir: PathBuf::from("."),
            log_pattern: DEFAULT_LOG_PATTERN.to_string(),
            output_path: PathBuf::from("satis_metrics.json"),
            recent_errors_limit: metrics.recent_errors_limit,
            recent_connections_limit: metrics.recent_connections_limit,
            gap_threshold_minutes: metrics.gap_threshold.num_minutes(),
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (SATLOG_*)
        figment = figment.merge(Env::prefixed("SATLOG_"));

        figment.extract()
    }

    /// Aggregation settings derived from this config.
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            recent_errors_limit: self.recent_errors_limit,
            recent_connections_limit: self.recent_connections_limit,
            gap_threshold: Duration::minutes(self.gap_threshold_minutes.max(0)),
        }
    }
}

/// Returns the platform-specific config directory for satlog.
///
/// On Linux: `~/.config/satlog`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("satlog"))
}
