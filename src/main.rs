//! Directory-Harvest main entry point
//!
//! This is the command-line interface for the Directory-Harvest record
//! extractor.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use directory_harvest::browser::ChromiumLauncher;
use directory_harvest::config::{
    validate, HarvestConfig, DEFAULT_INTER_PAGE_DELAY_SECS, DEFAULT_PAGE_COUNT,
};
use directory_harvest::crawler::{harvest, CrawlReport, TracingSink};
use directory_harvest::output::{export_records, print_statistics, ExportFormat, HarvestStatistics};
use directory_harvest::url::{classify_site, resolve_page_url};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Directory-Harvest: contact records from paginated directory sites
///
/// Directory-Harvest drives a headless browser through the list pages of a
/// supported directory site, extracts organization contact records and
/// writes them as CSV and/or JSON.
#[derive(Parser, Debug)]
#[command(name = "directory-harvest")]
#[command(version = "1.0.0")]
#[command(about = "Harvest contact records from directory sites", long_about = None)]
struct Cli {
    /// First list page of a supported directory site
    #[arg(value_name = "START_URL")]
    start_url: String,

    /// Number of list pages to visit (1-50)
    #[arg(short, long, default_value_t = DEFAULT_PAGE_COUNT)]
    pages: u32,

    /// Seconds to wait between list pages (0.5-10.0); detail pages use half
    #[arg(short, long, default_value_t = DEFAULT_INTER_PAGE_DELAY_SECS)]
    delay: f64,

    /// Show the browser window instead of running headless
    #[arg(long)]
    headed: bool,

    /// Path to the Chrome/Chromium executable
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,

    /// List page navigation timeout in seconds
    #[arg(long, value_name = "SECS")]
    nav_timeout: Option<u64>,

    /// Directory the export files are written to
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Export format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Both)]
    format: FormatArg,

    /// Validate the arguments and show the pages that would be visited
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Csv,
    Json,
    Both,
}

impl FormatArg {
    fn formats(self) -> &'static [ExportFormat] {
        match self {
            Self::Csv => &[ExportFormat::Csv],
            Self::Json => &[ExportFormat::Json],
            Self::Both => &[ExportFormat::Csv, ExportFormat::Json],
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = build_config(&cli);
    validate(&config).context("Invalid arguments")?;

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let report = harvest(config, ChromiumLauncher::new(), Arc::new(TracingSink))
        .await
        .context("Harvest failed")?;

    handle_results(&report, &cli)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("directory_harvest=info,warn"),
            1 => EnvFilter::new("directory_harvest=debug,info"),
            2 => EnvFilter::new("directory_harvest=trace,debug"),
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

fn build_config(cli: &Cli) -> HarvestConfig {
    let mut config = HarvestConfig::new(cli.start_url.as_str());
    config.page_count = cli.pages;
    config.inter_page_delay_secs = cli.delay;
    config.browser.headless = !cli.headed;
    config.browser.chrome_executable = cli.chrome.clone();
    if let Some(secs) = cli.nav_timeout {
        config.browser.list_navigation_timeout = Duration::from_secs(secs);
    }
    config
}

/// Handles the --dry-run mode: shows the site family and the page URLs
fn handle_dry_run(config: &HarvestConfig) -> anyhow::Result<()> {
    println!("=== Directory-Harvest Dry Run ===\n");

    let Some(site) = classify_site(&config.start_url) else {
        bail!("Unsupported site: {}", config.start_url);
    };

    println!("Site family: {}", site);
    println!("Headless: {}", config.browser.headless);
    println!("Delay between pages: {:.1}s", config.inter_page_delay_secs);
    if site.crawls_details() {
        println!("Delay between detail pages: {:.2}s", config.inter_page_delay_secs / 2.0);
    }

    println!("\nPages ({}):", config.page_count);
    for page in 1..=config.page_count {
        println!("  {:>2}. {}", page, resolve_page_url(&config.start_url, page));
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Prints statistics and writes the requested export files
fn handle_results(report: &CrawlReport, cli: &Cli) -> anyhow::Result<()> {
    let stats = HarvestStatistics::from_records(&report.records);
    if !cli.quiet {
        print_statistics(&stats, report);
    }

    if report.records.is_empty() {
        tracing::warn!("No records collected, nothing to export");
        return Ok(());
    }

    std::fs::create_dir_all(&cli.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            cli.output_dir.display()
        )
    })?;

    for format in cli.format.formats() {
        let path = export_records(&report.records, &cli.output_dir, *format)
            .with_context(|| format!("Failed to export {}", format))?;
        println!("✓ {} export written to: {}", format, path.display());
    }

    Ok(())
}
