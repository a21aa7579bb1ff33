//! goes-retrieve CLI - submits and tracks GOES historic retrieval queries.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use commands::query::QueryArgs;
use context::Context;

#[derive(Parser)]
#[command(name = "goes-retrieve")]
#[command(about = "Submits and tracks GOES historic retrieval queries", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Hidden: run the retrieval pipeline for an already-submitted query id
    /// (internal use only, reached via background submission/restart).
    #[arg(long, hide = true)]
    daemon_run: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a new retrieval query
    Submit {
        #[command(flatten)]
        args: QueryArgs,

        /// Schedule the query in the background instead of waiting in the foreground
        #[arg(long)]
        background: bool,
    },

    /// Validate a query without submitting it
    Validate {
        #[command(flatten)]
        args: QueryArgs,
    },

    /// Show a query's status, or list recent queries
    Status {
        /// Specific query id to show
        id: Option<uuid::Uuid>,

        /// Show the full history, not just recent/active queries
        #[arg(long)]
        all: bool,

        /// Follow/watch mode: refresh every N seconds
        #[arg(short, long)]
        follow: Option<u64>,
    },

    /// Restart a query from scratch
    Restart {
        /// Query id to restart
        id: uuid::Uuid,
    },

    /// Delete a query record
    Delete {
        /// Query id to delete
        id: uuid::Uuid,

        /// Also remove the query's destination directory
        #[arg(long)]
        purge: bool,

        /// Allow purging a query that is still processing
        #[arg(long)]
        force: bool,
    },

    /// List the valid satellites, sensors, levels, domains, products, and bands
    Catalog,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let ctx = Context::load()?;

    if let Some(id) = cli.daemon_run {
        return commands::daemon_run::daemon_run(&ctx, &id).await;
    }

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Submit { args, background } => commands::query::submit(&ctx, &args, background).await,
        Commands::Validate { args } => commands::query::validate(&ctx, &args),
        Commands::Status { id, all, follow } => commands::status::status(&ctx, id, all, follow).await,
        Commands::Restart { id } => commands::job::restart(&ctx, id).await,
        Commands::Delete { id, purge, force } => commands::job::delete(&ctx, id, purge, force).await,
        Commands::Catalog => commands::catalog::show(&ctx),
    }
}
