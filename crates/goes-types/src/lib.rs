//! Core query-model types for the GOES retrieval engine.
//!
//! This crate provides the fundamental data structures shared by every other crate
//! in the workspace:
//!
//! - [`Request`] - a submitted, unvalidated retrieval request
//! - [`CanonicalQuery`] - the normalized, internal form of a request
//! - [`DayKey`] - a calendar day, stored canonically as `YYYYJJJ`
//! - [`TimeRange`] - an inclusive intra-day minute range
//! - [`Satellite`], [`Sensor`], [`Level`], [`Domain`] - catalog identifiers

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod canonical_query;
mod date_key;
mod error;
mod request;
mod satellite;
mod time_range;

pub use canonical_query::{CanonicalQuery, Selection};
pub use date_key::DayKey;
pub use error::{QueryModelError, Result};
pub use request::{Request, ALL};
pub use satellite::{Domain, Level, Satellite, Sensor, GOES_EAST_CUTOVER};
pub use time_range::TimeRange;
