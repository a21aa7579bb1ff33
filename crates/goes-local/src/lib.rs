//! Local archive discovery and extraction.
//!
//! - [`path::archive_dir`] - week-directory layout under the local archive root
//! - [`discover::discover_and_filter`] / [`discover::scan_existing`] - candidate
//!   archives for a query, and the subset not yet present at the destination
//! - [`archive::process_archive`] - whole-copy or selective tar extraction of one
//!   archive

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod archive;
pub mod discover;
mod error;
mod path;

pub use archive::process_archive;
pub use discover::{discover_and_filter, scan_existing};
pub use error::{ArchiveError, LocalDiscoverError};
pub use path::{archive_dir, archive_glob_pattern};
