//! Betterplace-Scraper main entry point
//!
//! This is the command-line interface for the betterplace project scraper.

use betterplace_scraper::config::load_config_with_hash;
use betterplace_scraper::model::CrawlMode;
use betterplace_scraper::scrape_and_store;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Betterplace-Scraper: incremental crawler for fundraising projects
///
/// Crawls the paginated projects API, resolves category tags per record,
/// normalizes everything into snapshot rows, and appends them to SQLite.
/// The default run is an incremental update of the open projects; --all
/// performs a full rescan.
#[derive(Parser, Debug)]
#[command(name = "betterplace-scraper")]
#[command(version)]
#[command(about = "Incremental crawler for fundraising projects", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Full rescan: walk every remote page into the full table
    #[arg(short, long, conflicts_with = "stats")]
    all: bool,

    /// Show statistics from the database and exit
    #[arg(long)]
    stats: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.stats {
        handle_stats(&config)?;
    } else {
        let mode = if cli.all {
            CrawlMode::Exhaustive
        } else {
            CrawlMode::Incremental
        };
        handle_scrape(&config, mode).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("betterplace_scraper=info,warn"),
            1 => EnvFilter::new("betterplace_scraper=debug,info"),
            2 => EnvFilter::new("betterplace_scraper=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --stats mode: shows statistics for both configured tables
fn handle_stats(
    config: &betterplace_scraper::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    use betterplace_scraper::report::{load_statistics, print_statistics};
    use betterplace_scraper::storage::SqliteStore;
    use std::path::Path;

    println!("Database: {}\n", config.output.database_path);

    let store = SqliteStore::new(Path::new(&config.output.database_path))?;

    for table in [&config.output.full_table, &config.output.incremental_table] {
        match load_statistics(&store, table) {
            Ok(stats) => print_statistics(&stats),
            Err(e) => {
                tracing::warn!("No statistics for {}: {}", table, e);
            }
        }
    }

    Ok(())
}

/// Handles a scrape run in the given mode
async fn handle_scrape(
    config: &betterplace_scraper::Config,
    mode: CrawlMode,
) -> Result<(), Box<dyn std::error::Error>> {
    match scrape_and_store(config, mode).await {
        Ok(summary) => {
            println!(
                "✓ {} rows appended to {} ({} projects reported remotely, {:?})",
                summary.rows_persisted, summary.table, summary.total_projects, summary.elapsed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed, nothing was written: {}", e);
            Err(e.into())
        }
    }
}
