//! dcp - Daily Coding Problem newsletter archiver
//!
//! Each subcommand runs one batch job or maintenance operation against the
//! local archive and exits.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use archive::{ContentStats, ExtractStats, FetchStats, Session, SetupError};
use clap::{Parser, Subcommand};
use log::{error, warn};

#[derive(Parser)]
#[command(name = "dcp")]
#[command(version, about = "Archive Daily Coding Problem solutions from your mailbox", long_about = None)]
struct Cli {
    /// Config directory (credentials, tokens, settings.json)
    #[arg(long, global = true, env = "DCP_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Data directory (record files and solutions/)
    #[arg(long, global = true, env = "DCP_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download new newsletter emails from Gmail
    FetchEmails,

    /// Find solution links in stored emails
    ExtractLinks,

    /// Download problem and solution text for stored links
    FetchContent,

    /// Report missing problems, duplicates and unindexed files
    Check,

    /// Add solution links by hand
    AddLink {
        /// Solution URLs
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Index content files that have no index record
    Reindex,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(setup) = e.downcast_ref::<SetupError>() {
                error!("Setup failed: {}", setup);
            } else {
                error!("{:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let session = Session::open(cli.config_dir, cli.data_dir)?;

    match cli.command {
        Commands::FetchEmails => print_fetch_stats(&session.fetch_emails()?),
        Commands::ExtractLinks => print_extract_stats(&session.extract_links()?),
        Commands::FetchContent => print_content_stats(&session.fetch_contents()?),
        Commands::Check => print!("{}", session.check()?),
        Commands::AddLink { urls } => {
            let outcome = session.add_links(&urls)?;
            println!(
                "Added {}, already known {}, rejected {}",
                outcome.added.len(),
                outcome.known.len(),
                outcome.rejected.len()
            );
            for (url, reason) in &outcome.rejected {
                println!("  rejected {}: {}", url, reason);
            }
        }
        Commands::Reindex => println!("Indexed {} content files", session.reindex()?),
    }

    Ok(())
}

fn print_fetch_stats(stats: &FetchStats) {
    println!(
        "Emails: {} stored, {} already present ({} pages, {}ms)",
        stats.messages_stored, stats.messages_skipped, stats.pages, stats.duration_ms
    );
}

fn print_extract_stats(stats: &ExtractStats) {
    println!(
        "Links: {} added, {} known, {} malformed from {} emails ({}ms)",
        stats.links_added,
        stats.links_known,
        stats.links_malformed,
        stats.emails_scanned,
        stats.duration_ms
    );
}

fn print_content_stats(stats: &ContentStats) {
    println!(
        "Content: {} fetched, {} already present, {} failed ({}ms)",
        stats.fetched,
        stats.already_present,
        stats.failed(),
        stats.duration_ms
    );
    for (url, e) in &stats.failures {
        warn!("{}: {}", url, e);
    }
}
