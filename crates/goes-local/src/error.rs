//! Errors raised while discovering and processing local archives.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from [`crate::discover::discover_and_filter`] and
/// [`crate::discover::scan_existing`].
#[derive(Error, Debug)]
pub enum LocalDiscoverError {
    /// A `YYYYJJJ` day key in the query could not be parsed.
    #[error(transparent)]
    BadDayKey(#[from] goes_types::QueryModelError),

    /// The archive glob pattern built from a day key was not valid.
    #[error("invalid glob pattern: {0}")]
    Glob(String),

    /// A directory (the archive week directory, or a destination directory) could
    /// not be read.
    #[error("failed to read directory '{path}': {source}")]
    ReadDir {
        /// The directory that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors from [`crate::archive::process_archive`].
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The archive file could not be opened.
    #[error("failed to open archive '{path}': {source}")]
    Open {
        /// The archive path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The archive could not be read as a gzip-compressed tar stream.
    #[error("failed to read archive '{path}': {source}")]
    Read {
        /// The archive path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The archive could not be copied whole into the destination directory.
    #[error("failed to copy archive '{path}' into destination: {source}")]
    Copy {
        /// The archive path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// No member of the archive matched the requested bands/products.
    #[error("no members in '{path}' matched the requested bands/products")]
    NoMatchingMembers {
        /// The archive path.
        path: PathBuf,
    },
}
