//! Players command: per-player statistics table.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use anyhow::Result;

use satlog_core::PlayerStats;

use super::util::{build_report, format_duration};
use crate::Config;

pub fn run<W: Write>(writer: &mut W, config: &Config, dir: Option<&Path>, json: bool) -> Result<()> {
    let report = build_report(config, dir)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &report.players)?;
        writeln!(writer)?;
    } else {
        write_table(writer, &report.players)?;
    }

    Ok(())
}

/// Writes one aligned row per player, sorted by name.
pub fn write_table<W: Write>(writer: &mut W, players: &BTreeMap<String, PlayerStats>) -> Result<()> {
    if players.is_empty() {
        writeln!(writer, "No players found.")?;
        return Ok(());
    }

    let width = players
        .keys()
        .map(|name| name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());

    writeln!(
        writer,
        "{:<width$}  {:>5}  {:>8}  {:>9}",
        "Player", "Joins", "Sessions", "Playtime"
    )?;
    for (name, stats) in players {
        writeln!(
            writer,
            "{:<width$}  {:>5}  {:>8}  {:>9}",
            name,
            stats.join_count,
            stats.session_count,
            format_duration(stats.total_playtime_seconds)
        )?;
    }

    Ok(())
}
