//! # Archive Crawler
//!
//! Walks a blog's monthly archive pages (`<base_url>/<year>/<month>`) over a
//! range of years, collects every article title and link, and writes them to
//! a single HTML index grouped by month.
//!
//! ## Usage
//!
//! ```sh
//! archive_crawler pyimagesearch --offline --from-year 2016
//! ```
//!
//! ## Architecture
//!
//! 1. **Setup**: load config, validate the year range, prepare `output/`
//! 2. **Crawl**: fetch and parse each archive page in (year, month) order
//! 3. **Cache** (`--offline`): save each article page under `output/articles/`
//! 4. **Output**: write `output/<name>.html` (and `.json` with `--json`)
//!
//! A month that fails is skipped; only setup failures stop the run.

use chrono::{Datelike, Local};
use clap::Parser;
use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cache;
mod cli;
mod config;
mod crawler;
mod error;
mod fetcher;
mod models;
mod outputs;
mod scrapers;
mod utils;

use cli::Cli;
use config::CrawlConfig;
use crawler::Crawler;
use fetcher::HttpFetcher;
use outputs::{html, json};
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("archive_crawler starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    // --- Setup: every failure here is fatal ---
    let config = match args.config.as_deref() {
        Some(path) => CrawlConfig::load(Path::new(path)),
        None => Ok(CrawlConfig::default()),
    }
    .inspect_err(|e| error!(error = %e, "Invalid configuration"))?;
    let config = Arc::new(config);

    let current_year = Local::now().year();
    let (from_year, to_year) = args
        .year_range(config.default_from_year, current_year)
        .inspect_err(|e| error!(error = %e, "Invalid year range"))?;
    info!(from_year, to_year, offline = args.offline, base_url = %config.base_url, "Crawl range resolved");

    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let fetcher = HttpFetcher::new(&config)?;

    // ---- Crawl ----
    let mut crawler = Crawler::new(Arc::clone(&config), fetcher);
    let report = crawler.run(from_year, to_year, args.offline).await;

    // ---- Output ----
    let html_path = config.report_path(&args.output_file, "html");
    if let Err(e) = html::write_report(&report, &config, &html_path).await {
        error!(path = %html_path.display(), error = %e, "Failed to write HTML report");
        return Err(e.into());
    }

    if args.json {
        let json_path = config.report_path(&args.output_file, "json");
        if let Err(e) = json::write_report_json(&report, &json_path).await {
            error!(path = %json_path.display(), error = %e, "Failed to write JSON report");
        }
    }

    let stats = crawler.stats();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        months = report.len(),
        articles = stats.articles,
        months_failed = stats.months_failed,
        path = %html_path.display(),
        "Execution complete"
    );

    Ok(())
}
