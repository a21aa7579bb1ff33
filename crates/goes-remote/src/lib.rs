//! Remote discovery and download of GOES objects from the public `noaa-goes*`
//! buckets on AWS S3.
//!
//! This crate covers the two remote-facing operations of the retrieval engine:
//! working out which objects a query needs ([`discover`]) and fetching them
//! ([`download`]). Both are addressed anonymously through `aws-sdk-s3`; no
//! credentials are ever required or read.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bucket;
mod client;
mod config;
mod discover;
mod download;
mod error;

pub use bucket::{bucket_name, product_path};
pub use client::build_client;
pub use config::RemoteConfig;
pub use discover::{l1b_target, l2_targets, discover, DiscoverTarget};
pub use download::{download, DownloadOutcome, ProgressSink};
pub use error::{DownloadError, RemoteDiscoverError};
