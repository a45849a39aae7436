//! Skein CLI library
//!
//! This module contains the core CLI logic for the Skein narrative compiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    path::{Path, PathBuf},
};

use log::{info, warn};

use skein::{
    ScriptBuilder, SkeinError,
    assets::{DirectoryAssets, UncheckedAssets},
};

/// Run the Skein CLI application
///
/// This function loads the export, compiles it and replaces the output
/// directory with the generated scripts.
///
/// # Errors
///
/// Returns `SkeinError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Export parsing errors
/// - Fatal compilation errors
/// - An output directory holding files Skein did not generate
pub fn run(args: &Args) -> Result<(), SkeinError> {
    info!(
        input_path = args.input,
        output_path = args.output;
        "Processing export"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let source = fs::read_to_string(&args.input)?;

    let builder = ScriptBuilder::new(app_config);
    let project = builder.parse(&source)?;

    let output = Path::new(&args.output);
    let compilation = match game_dir(args.game_dir.as_deref(), output) {
        Some(dir) => {
            info!(game_dir = dir.display().to_string(); "Checking asset paths");
            builder.compile(&project, &DirectoryAssets::new(dir))?
        }
        None => {
            info!("No game directory found, asset paths are not checked");
            builder.compile(&project, &UncheckedAssets)?
        }
    };

    builder.write(&compilation, output)?;

    let diagnostics = compilation.diagnostics().len();
    if diagnostics > 0 {
        warn!(
            count = diagnostics,
            log_file = builder.config().output().log_file();
            "Compiled with warnings"
        );
    }
    info!(output_dir = args.output, scripts = compilation.scripts().len(); "Scripts generated");

    Ok(())
}

/// The explicit game directory, else the closest ancestor of the output
/// directory named `game`.
fn game_dir(explicit: Option<&str>, output: &Path) -> Option<PathBuf> {
    if let Some(dir) = explicit {
        return Some(PathBuf::from(dir));
    }
    let output = std::path::absolute(output).ok()?;
    output
        .ancestors()
        .find(|ancestor| ancestor.file_name().is_some_and(|name| name == "game"))
        .map(Path::to_path_buf)
}
