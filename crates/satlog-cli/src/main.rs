use std::io::{BufWriter, Write, stdout};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use satlog_cli::commands::{analyze, players};
use satlog_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so `--json` output on stdout stays parseable
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = stdout();
    let mut writer = BufWriter::new(stdout.lock());

    match &cli.command {
        Some(Commands::Analyze { dir, output, json }) => {
            analyze::run(
                &mut writer,
                &config,
                dir.as_deref(),
                output.as_deref(),
                *json,
            )?;
        }
        Some(Commands::Players { dir, json }) => {
            players::run(&mut writer, &config, dir.as_deref(), *json)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    writer.flush()?;
    Ok(())
}
