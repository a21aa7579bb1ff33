//! Rust library for the GOES historic retrieval engine.
//!
//! This is a facade crate that re-exports the workspace's core crates for
//! convenient access from a single dependency: the query model
//! ([`goes_types`]), the satellite catalog and normalizer ([`goes_catalog`]),
//! local-archive and remote-S3 discovery ([`goes_local`], [`goes_remote`]),
//! the query-record store ([`goes_store`]), and the per-query orchestrator
//! ([`goes_engine`]).
//!
//! # Quick start
//!
//! ```ignore
//! use goes_lib::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let catalog = Catalog;
//!     let request: Request = serde_json::from_str(r#"{
//!         "nivel": "L1b",
//!         "dominio": "fd",
//!         "bandas": ["ALL"],
//!         "fechas": {"20231026": ["12:00"]}
//!     }"#)?;
//!
//!     let query = goes_catalog::normalize(&request, &catalog)?;
//!     let config = EngineConfig::from_env()?;
//!     let gate = goes_engine::evaluate(&query, &config);
//!     assert!(gate.accepted());
//!
//!     let store = FileQueryStore::with_default_path()?;
//!     Ok(())
//! }
//! ```

#![doc(issue_tracker_base_url = "https://github.com/noaa-goes-retrieval/goes-retrieve/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Query model
pub use goes_types::{
    CanonicalQuery, DayKey, Domain, Level, QueryModelError, Request, Satellite, Selection, Sensor,
    TimeRange, ALL,
};

// Catalog, normalizer, estimator
pub use goes_catalog::{estimate_files_summary, normalize, Catalog, EstimateSummary};

// Local discovery and archive processing
pub use goes_local::{discover_and_filter, process_archive, scan_existing, ArchiveError, LocalDiscoverError};

// Remote discovery and download
pub use goes_remote::{
    bucket_name, build_client, discover as discover_remote, download as download_remote,
    DiscoverTarget, DownloadError, DownloadOutcome, ProgressSink, RemoteConfig,
    RemoteDiscoverError,
};

// Persistent query records
pub use goes_store::{
    FileQueryStore, QueryId, QueryRecord, QueryReport, QueryStatus, QueryStore, SourceBreakdown,
    SourceSummary,
};

// Orchestrator
pub use goes_engine::{evaluate, EngineConfig, EngineError, GateResult, ProcessorMode, Rejection};

/// Convenient imports for application code driving the retrieval engine end to
/// end: submit, gate, persist, and process a query.
pub mod prelude {
    pub use crate::{
        bucket_name, discover_and_filter, estimate_files_summary, evaluate, normalize,
        process_archive, scan_existing, ArchiveError, CanonicalQuery, Catalog, DayKey, Domain,
        EngineConfig, EstimateSummary, FileQueryStore, GateResult, Level, QueryId, QueryModelError,
        QueryRecord, QueryReport, QueryStatus, QueryStore, Request, Satellite, Selection, Sensor,
        TimeRange, ALL,
    };
}
