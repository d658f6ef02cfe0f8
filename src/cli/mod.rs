//! CLI command definitions for layerconf
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

pub mod export;

use clap::{Parser, Subcommand};
use export::ExportArgs;
use std::path::PathBuf;

/// Layered configuration resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding .conf.default.* and .conf.* files
    #[arg(short, long, default_value = ".", global = true)]
    pub dir: PathBuf,

    /// Apply environment values as raw strings (skip JSON/numeric coercion)
    #[arg(long, global = true)]
    pub raw_env: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Emit shell export lines for resolved values (default if no subcommand given)
    Export(ExportArgs),

    /// Print the fully resolved configuration as pretty JSON
    Show,
}
