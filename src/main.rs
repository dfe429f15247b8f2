//! dirpoll - run one poll cycle of the directory crawler.
//!
//! Usage:
//!   dirpoll scan [PATH]      Crawl and print the queued files
//!   dirpoll export [PATH]    Crawl and write the outcome as JSON
//!   dirpoll --help           Show help

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Context, Result};
use tracing_subscriber::EnvFilter;

use dirpoll_scan::{CrawlConfig, DirectoryScanner, LocalListing, ScanOutcome, limit_from_config};

#[derive(Parser)]
#[command(
    name = "dirpoll",
    version,
    about = "Depth-bounded directory crawler for polling ingestion",
    long_about = "dirpoll lists a directory tree the way a polling consumer would: \
                  bounded by depth, filtered by patterns and capped per poll."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl and print the files one poll would queue
    Scan {
        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Crawl and export the outcome to JSON
    Export {
        #[command(flatten)]
        crawl: CrawlArgs,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CrawlArgs {
    /// Directory to crawl (overrides the config file path)
    path: Option<String>,

    /// TOML crawl configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Descend into subdirectories
    #[arg(short, long)]
    recursive: bool,

    /// Only queue files listed at this depth or deeper
    #[arg(long)]
    min_depth: Option<u32>,

    /// Recurse while the current depth is below this value
    #[arg(long)]
    max_depth: Option<u32>,

    /// Maximum files queued per poll (0 = unlimited)
    #[arg(short = 'n', long)]
    max_files: Option<usize>,

    /// Only queue files matching this glob (repeatable)
    #[arg(long)]
    include: Vec<String>,

    /// Skip files matching this glob (repeatable)
    #[arg(long)]
    exclude: Vec<String>,

    /// Skip files with the hidden attribute
    #[arg(long)]
    skip_hidden: bool,

    /// Skip a file while a sibling `<file><SUFFIX>` exists
    #[arg(long)]
    marker_suffix: Option<String>,

    /// List symbolic links as their targets instead of skipping them
    #[arg(long)]
    follow_symlinks: bool,
}

impl CrawlArgs {
    /// Merge the config file (if any) with command-line overrides.
    fn into_config(self) -> Result<CrawlConfig> {
        let mut config = match &self.config {
            Some(path) => CrawlConfig::load(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => CrawlConfig::new(self.path.clone().unwrap_or_else(|| ".".to_string())),
        };

        if let Some(path) = self.path {
            config.share.clear();
            config.path = path;
        }
        config.recursive |= self.recursive;
        if let Some(min_depth) = self.min_depth {
            config.min_depth = min_depth;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(max_files) = self.max_files {
            config.max_files_per_poll = max_files;
        }
        config.include.extend(self.include);
        config.exclude.extend(self.exclude);
        config.skip_hidden |= self.skip_hidden;
        if self.marker_suffix.is_some() {
            config.marker_suffix = self.marker_suffix;
        }
        config.follow_symlinks |= self.follow_symlinks;

        config.validate().context("Invalid crawl configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan { crawl } => {
            let outcome = run_poll(crawl.into_config()?)?;
            print_outcome(&outcome);
        }
        Command::Export { crawl, output } => {
            let outcome = run_poll(crawl.into_config()?)?;
            run_export(&outcome, output)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("dirpoll={level},dirpoll_scan={level},dirpoll_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a single poll cycle over the configured endpoint.
fn run_poll(config: CrawlConfig) -> Result<ScanOutcome> {
    tracing::info!(root = %config.endpoint_path(), recursive = config.recursive, "polling");

    let listing = LocalListing::new().with_follow_symlinks(config.follow_symlinks);
    let scanner = DirectoryScanner::from_config(listing, &config)
        .context("Failed to set up scanner")?;
    let outcome = scanner
        .poll(&limit_from_config(&config))
        .context("Scan failed")?;

    tracing::info!(
        files = outcome.records.len(),
        truncated = outcome.truncated,
        "poll finished"
    );
    Ok(outcome)
}

/// Print queued records and a summary.
fn print_outcome(outcome: &ScanOutcome) {
    println!();
    println!("{}", "─".repeat(78));
    println!(
        " {:<44} {:>10}  {:<20} {}",
        "File", "Size", "Modified", "Attr"
    );
    println!("{}", "─".repeat(78));

    for record in &outcome.records {
        println!(
            " {:<44} {:>10}  {:<20} {}",
            truncate(&record.file_name, 44),
            format_size(record.length),
            record.last_modified.format("%Y-%m-%d %H:%M:%S"),
            record.attributes.flags()
        );
    }

    println!("{}", "─".repeat(78));
    println!(
        " {} files, {} total, {} directories listed in {:.2}s",
        outcome.records.len(),
        format_size(outcome.total_length()),
        outcome.stats.dirs_listed,
        outcome.elapsed.as_secs_f64()
    );
    if outcome.stats.skipped_by_depth > 0 || outcome.stats.rejected_by_filter > 0 {
        println!(
            " {} skipped by depth, {} rejected by filters",
            outcome.stats.skipped_by_depth, outcome.stats.rejected_by_filter
        );
    }
    if outcome.truncated {
        println!(" Limit reached: more files remain for the next poll");
    }
}

/// Export a poll outcome to JSON.
fn run_export(outcome: &ScanOutcome, output: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome)?;

    match output {
        Some(output_path) => {
            std::fs::write(&output_path, json)
                .with_context(|| format!("Failed to write {}", output_path.display()))?;
            eprintln!("Exported to {}", output_path.display());
        }
        None => {
            println!("{}", json);
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Truncate a string to max length, keeping the tail.
fn truncate(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len {
        s.to_string()
    } else {
        let tail: String = s.chars().skip(count - (max_len - 1)).collect();
        format!("…{}", tail)
    }
}
