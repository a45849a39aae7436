//! Writing generated files to the output directory.
//!
//! A run replaces the previous run's output entirely. Before deleting
//! anything the directory is checked: it may only hold the directories of
//! the current hierarchy roots and files carrying the generated-file prefix.
//! Anything else means the directory is not ours and nothing is touched.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};
use thiserror::Error;

/// Errors raised while writing output.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot write `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("refusing to clean `{path}`: it was not generated")]
    UnexpectedContent { path: PathBuf },
}

impl Error {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A file to write, relative to the output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// Removes the output of a previous run.
///
/// `expected_dirs` are the directory names this run generates at the top
/// level; top-level files must start with `prefix`. A missing `root` is
/// fine.
///
/// # Errors
///
/// Returns [`Error::UnexpectedContent`] for the first foreign entry, and
/// [`Error::Io`] when the directory cannot be read or removed.
pub fn clean_up(root: &Path, expected_dirs: &[String], prefix: &str) -> Result<(), Error> {
    if !root.exists() {
        return Ok(());
    }

    let entries = fs::read_dir(root).map_err(|err| Error::io(root, err))?;
    for entry in entries {
        let entry = entry.map_err(|err| Error::io(root, err))?;
        let path = entry.path();
        let file_type = entry.file_type().map_err(|err| Error::io(&path, err))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        let expected = if file_type.is_dir() {
            expected_dirs.contains(&name)
        } else {
            name.starts_with(prefix)
        };
        if !expected {
            return Err(Error::UnexpectedContent { path });
        }
    }

    fs::remove_dir_all(root).map_err(|err| Error::io(root, err))?;
    debug!(root:? = root; "Previous output removed");
    Ok(())
}

/// Writes files below `root`, creating directories as needed.
///
/// # Errors
///
/// Returns [`Error::Io`] for the first file that cannot be written.
pub fn write_files(root: &Path, files: &[GeneratedFile]) -> Result<(), Error> {
    for file in files {
        let path = root.join(&file.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }
        fs::write(&path, &file.contents).map_err(|err| Error::io(&path, err))?;
    }

    info!(root:? = root, files = files.len(); "Output written");
    Ok(())
}
