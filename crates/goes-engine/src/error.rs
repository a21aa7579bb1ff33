//! The orchestrator's own error type.

use thiserror::Error;

/// Errors that abort an entire query run, transitioning its record to `error`.
///
/// Per-target failures (a corrupt archive, a missing remote object) never reach
/// this type: they are folded into the failed-target set and surface only
/// through the recovery query in the final report. Only conditions that make
/// the pipeline itself unable to continue are represented here.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The request failed normalization before any work was scheduled.
    #[error(transparent)]
    Normalize(#[from] goes_types::QueryModelError),

    /// The estimated file count or size exceeds a configured acceptance limit.
    #[error("{0}")]
    CapacityExceeded(String),

    /// The destination directory could not be created.
    #[error("failed to create destination directory '{path}': {source}")]
    CreateDestination {
        /// The destination path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The destination directory could not be scanned while building the final report.
    #[error("failed to scan destination directory '{path}': {source}")]
    ScanDestination {
        /// The destination path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The persistent query store could not be read or written.
    #[error(transparent)]
    Store(#[from] goes_store::StoreError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The remote bucket or product path could not be resolved for this query.
    #[error(transparent)]
    RemoteDiscover(#[from] goes_remote::RemoteDiscoverError),

    /// The remote downloader could not prepare its destination directory.
    #[error(transparent)]
    Download(#[from] goes_remote::DownloadError),
}
