//! Shared setup used by every subcommand: configuration, the query store, and
//! the satellite catalog.

use anyhow::{Context as _, Result};
use goes_lib::prelude::*;

/// Everything a subcommand needs to talk to the retrieval engine.
pub(crate) struct Context {
    pub(crate) catalog: Catalog,
    pub(crate) store: FileQueryStore,
    pub(crate) config: EngineConfig,
}

impl Context {
    /// Loads configuration from the environment and opens the query store at
    /// its configured path, creating it if this is the first run.
    pub(crate) fn load() -> Result<Self> {
        let config = EngineConfig::from_env().context("failed to load engine configuration")?;
        let store =
            FileQueryStore::new(config.db_path.clone()).context("failed to open query store")?;
        Ok(Self {
            catalog: Catalog,
            store,
            config,
        })
    }
}
