//! Errors raised while discovering and downloading remote archives.

use thiserror::Error;

/// Errors from [`crate::discover::discover`] and the bucket/path helpers it
/// depends on.
#[derive(Error, Debug)]
pub enum RemoteDiscoverError {
    /// A query has no day keys to derive a bucket name from.
    #[error("query has no dates; cannot resolve a satellite bucket")]
    NoDates,

    /// A `YYYYJJJ` day key in the query could not be parsed.
    #[error(transparent)]
    BadDayKey(#[from] goes_types::QueryModelError),
}

/// Errors from [`crate::download::download`].
#[derive(Error, Debug)]
pub enum DownloadError {
    /// The destination file could not be created.
    #[error("failed to create destination file '{path}': {source}")]
    CreateFile {
        /// The destination path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The destination file could not be written.
    #[error("failed to write destination file '{path}': {source}")]
    WriteFile {
        /// The destination path.
        path: std::path::PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The object could not be fetched after exhausting retries.
    ///
    /// Carries a description rather than the SDK's own error type, which keeps this
    /// enum free of `aws-sdk-s3`'s generic `SdkError<E, R>` signature.
    #[error("failed to download '{key}' after {attempts} attempt(s): {detail}")]
    GetObject {
        /// The S3 key that could not be fetched.
        key: String,
        /// Number of attempts made, including the first.
        attempts: u32,
        /// A description of the last error encountered.
        detail: String,
    },
}
