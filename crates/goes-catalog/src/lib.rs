//! Satellite/product catalog, query normalizer, and file/size estimator.
//!
//! - [`Catalog`] - valid satellites/sensors/levels/domains/products/bands, band
//!   expansion and validation
//! - [`normalize`] - turns a [`goes_types::Request`] into a
//!   [`goes_types::CanonicalQuery`]
//! - [`estimate_files_summary`] - file-count and size estimation used by the
//!   acceptance gate

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod catalog;
mod data;
mod estimator;
mod normalize;

pub use catalog::Catalog;
pub use estimator::{estimate_files_summary, periodicity_minutes, weight_mb, EstimateSummary};
pub use normalize::normalize;
