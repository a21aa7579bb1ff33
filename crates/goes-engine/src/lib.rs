//! Per-query retrieval orchestrator.
//!
//! - [`config::EngineConfig`] - every environment-sourced knob, with defaults
//! - [`gate`] - the acceptance gate: rejects oversized/disk-constrained queries
//! - [`pipeline::run`] - the full local-then-remote retrieval pipeline
//! - [`recovery`] - reconstructing a recovery request from failed targets
//! - [`report`] - building the persisted [`goes_store::QueryReport`]

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod gate;
pub mod pipeline;
pub mod recovery;
pub mod report;

pub use config::{EngineConfig, ProcessorMode};
pub use error::EngineError;
pub use gate::{evaluate, GateResult, Rejection};
pub use pipeline::run;
