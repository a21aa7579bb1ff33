//! Hidden entry point for background query processing.
//!
//! Reached when the binary is re-executed with `--daemon-run <id>` by
//! [`crate::commands::query::submit`] or [`crate::commands::job::restart`] so
//! the pipeline survives the originating CLI invocation exiting.

use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::context::Context;

/// Runs the retrieval pipeline for `id_str` to completion, persisting
/// progress and the final report through the query store.
pub(crate) async fn daemon_run(ctx: &Context, id_str: &str) -> Result<()> {
    let id: uuid::Uuid = id_str.parse().context("invalid query id")?;

    // Confirm the record exists before committing to a run; `goes_engine::run`
    // itself persists the `error` state for anything that fails afterward.
    ctx.store.load(id).await.context("query not found")?;

    let store: Arc<dyn goes_lib::QueryStore> = Arc::new(ctx.store.clone());
    let config = Arc::new(ctx.config.clone());
    let s3_client = Arc::new(goes_remote::build_client(&config.remote).await);

    goes_engine::run(store, s3_client, config, id).await;

    Ok(())
}
