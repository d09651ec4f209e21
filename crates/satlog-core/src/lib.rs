//! Core analysis for Satisfactory dedicated-server logs.
//!
//! This crate contains the whole log-to-report pipeline:
//! - Reading: discovering `FactoryGame*.log` files and streaming their lines
//! - Extraction: classifying lines into typed events
//! - Sessions: reconstructing per-player play sessions within each file
//! - Metrics: folding events and sessions into a dashboard report

mod error;
pub mod event;
pub mod extract;
pub mod metrics;
pub mod pipeline;
pub mod reader;
pub mod recent;
pub mod report;
pub mod session;
pub mod timestamp;

pub use error::Error;
pub use event::{ConnectionOutcome, EventKind, LogEvent};
pub use metrics::{MetricsAggregator, MetricsConfig};
pub use pipeline::{analyze_dir, analyze_files};
pub use reader::DEFAULT_LOG_PATTERN;
pub use report::{MetricsReport, PlayerStats, Summary, UptimeWindow};
pub use session::{PlayerSession, SessionReconstructor};
pub use timestamp::TimestampParseError;
