//! layerconf CLI
//!
//! Resolves the layered configuration for a working directory and either
//! emits shell `export` lines or prints the resolved object.

use anyhow::Result;
use clap::Parser;
use layerconf::ConfigResolver;
use layerconf::cli::export::{ExportArgs, run_export};
use layerconf::cli::{Cli, Command};
use std::fs::OpenOptions;
use tracing::{Level, debug};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on --log option
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    match cli.log.as_str() {
        "0" | "off" => {
            // No logging
        }
        "1" | "stdout" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stdout)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        "2" | "stderr" => {
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(std::io::stderr)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        filename => {
            // Log to file (append mode)
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(filename)?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_writer(file)
                .with_ansi(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    debug!("Resolving configuration in {}", cli.dir.display());
    let resolved = ConfigResolver::new()
        .with_working_dir(&cli.dir)
        .with_raw_env(cli.raw_env)
        .resolve(None)?;

    match cli.command {
        Some(Command::Export(args)) => run_export(&resolved, &args),
        Some(Command::Show) => println!("{}", serde_json::to_string_pretty(&resolved)?),
        None => run_export(&resolved, &ExportArgs::default()),
    }

    Ok(())
}
