//! chiketto - Jira metrics for Kanban
//!
//! Extracts issues from Jira projects, enriches them with Kanban workflow
//! attributes and writes them out for analysis.
//!
//! Usage:
//!   chiketto [PROJECT]... --from-date DATE [OPTIONS]
//!
//! Exit codes: 0 success, 1 extraction failure, 2 invalid usage.

mod cli;
mod run;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for extracted data
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let invocation = match cli::parse(std::env::args_os()) {
        Ok(invocation) => invocation,
        Err(e) => e.exit(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run::run(invocation))
}
