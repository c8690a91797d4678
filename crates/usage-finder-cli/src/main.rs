//! Usage finder CLI
//!
//! Searches a folder of checked out repositories for usages of design
//! system components and writes one JSON object per usage.
//!
//! ```bash
//! find-usages ~/repos --component govukButton
//! find-usages ~/repos --output-sqlite usages.db
//! ```
//!
//! Logs go to stderr. Set `RUST_LOG` to control them or pass `--verbose`.

mod args;
mod components;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use usage_finder_core::{FinderConfig, UsageFinder};

use args::{Cli, OutputTarget};
use output::SQLITE_BATCH_SIZE;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    run(cli).await.inspect_err(|e| error!("{:#}", e))
}

// stdout carries the usages, so logs always go to stderr
fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = FinderConfig::new(&cli.search_path).with_env_overrides();
    if let Some(url) = &cli.web_base_url {
        config = config.with_web_base_url(url);
    }
    config.validate().context(
        "Search path must be a folder with git repositories checked out as immediate sub folders",
    )?;

    let components =
        components::resolve_components(cli.component.as_deref(), cli.components.as_deref())?;

    let finder = UsageFinder::new(&config);
    let usages = finder.find_all_usages(&components)?;

    let written = match cli.output_target() {
        OutputTarget::Stdout => output::output_to_stdout(usages).await?,
        OutputTarget::File(path) => output::output_to_file(usages, &path).await?,
        OutputTarget::Sqlite { database, table } => {
            output::output_to_sqlite(usages, &database, &table, SQLITE_BATCH_SIZE).await?
        }
    };

    info!("Found {} usages of {} components", written, components.len());
    Ok(())
}
