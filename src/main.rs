//! Site-Archiver main entry point
//!
//! This is the command-line interface for the single-origin site archiver.

use anyhow::Context;
use clap::Parser;
use site_archiver::archive::HttpFetcher;
use site_archiver::config::{load_config_with_hash, validate, Config};
use site_archiver::crawler::run_crawl;
use site_archiver::output::{print_statistics, RunLog, SiteClock};
use site_archiver::render::chrome::ChromeRenderer;
use site_archiver::render::Renderer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Site-Archiver: an offline mirror builder for one site
///
/// Site-Archiver visits every page reachable from the site root exactly once,
/// prints each rendered page to PDF, downloads linked documents, and mirrors
/// the site's breadcrumb hierarchy as a directory tree.
#[derive(Parser, Debug)]
#[command(name = "site-archiver")]
#[command(version = "1.0.0")]
#[command(about = "An offline mirror builder for a single site", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be archived without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Site root to archive, overriding `site.origin`
    #[arg(long, value_name = "URL")]
    origin: Option<String>,

    /// Archive root directory, overriding `archive.base-dir`
    #[arg(long, value_name = "DIR")]
    output: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.origin.is_some() || cli.output.is_some() {
        config.apply_overrides(cli.origin, cli.output);
        validate(&config).context("invalid command-line override")?;
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, &config_hash).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_archiver=info,warn"),
            1 => EnvFilter::new("site_archiver=debug,info"),
            2 => EnvFilter::new("site_archiver=trace,debug"),
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

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Site-Archiver Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", config.site.origin);
    println!("  UTC offset: {:+}h", config.site.utc_offset_hours);
    println!("  Home breadcrumb label: {}", config.site.home_label);

    println!("\nArchive:");
    println!("  Root: {}", config.archive.base_dir);
    println!("  Log: {}", config.log_path().display());

    println!("\nBrowser:");
    println!("  User agent: {}", config.browser.user_agent);
    println!("  Locale: {}", config.browser.locale);
    println!(
        "  Viewport: {}x{}",
        config.browser.viewport_width, config.browser.viewport_height
    );
    println!(
        "  Navigation timeout: {}ms",
        config.browser.navigation_timeout_ms
    );
    println!("  Command timeout: {}ms", config.browser.command_timeout_ms);
    println!("  Headless: {}", config.browser.headless);

    println!("\nSnapshots:");
    println!(
        "  Paper: {}in x {}in, margin {}px",
        config.snapshot.paper_width_in, config.snapshot.paper_height_in, config.snapshot.margin_px
    );
    println!(
        "  Lazy pages: scroll {}px every {}ms, settle {}ms",
        config.scroll.step_px, config.scroll.interval_ms, config.scroll.settle_ms
    );

    println!("\nAttachments:");
    println!("  Extensions: {}", config.assets.extensions.join(", "));
    println!(
        "  Excluded files ({}):",
        config.assets.excluded_filenames.len()
    );
    for name in &config.assets.excluded_filenames {
        println!("  - {}", name);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start archiving from {}", config.site.origin);
}

/// Handles the main crawl operation
///
/// Failing to create the archive root or the run log is fatal. Once the crawl
/// starts, page failures are absorbed and only reported.
async fn handle_crawl(config: Config, config_hash: &str) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(&config.archive.base_dir)
        .await
        .with_context(|| format!("failed to create archive root {}", config.archive.base_dir))?;

    let clock = SiteClock::new(config.site.utc_offset_hours);
    let log_path = config.log_path();
    let log = Arc::new(
        RunLog::create(&log_path, clock)
            .with_context(|| format!("failed to open run log {}", log_path.display()))?,
    );
    log.record(format!("Configuration hash: {}", config_hash));

    let fetcher = Arc::new(HttpFetcher::new(&config.browser)?);
    let renderer = Arc::new(ChromeRenderer::launch(&config.browser).await?);

    tracing::info!("Archiving {} into {}", config.site.origin, config.archive.base_dir);
    let result = run_crawl(config, renderer.clone(), fetcher, log).await;

    if let Err(e) = renderer.shutdown().await {
        tracing::warn!("Failed to shut down browser: {}", e);
    }

    let stats = result?;
    print_statistics(&stats);
    Ok(())
}
