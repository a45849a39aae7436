//! Command-line argument definitions for the Skein CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control the export and output paths, the
//! configuration file, asset checks, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the Skein narrative compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the articy:draft JSON export
    #[arg(help = "Path to the input export")]
    pub input: String,

    /// Directory receiving the generated scripts; its previous contents are
    /// replaced
    #[arg(short, long, default_value = "generated")]
    pub output: String,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Ren'Py game directory used to check asset paths
    #[arg(long)]
    pub game_dir: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
