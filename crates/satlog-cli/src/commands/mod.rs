//! CLI subcommand implementations.

pub mod analyze;
pub mod players;
mod util;
