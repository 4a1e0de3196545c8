//! JSON dump of the crawl report.
//!
//! Written next to the HTML index when requested, for consumers that want
//! the article list without scraping the report back out of HTML.
//!
//! ```json
//! { "months": [ { "year": 2020, "month": 3, "articles": [ { "name": "...", "url": "..." } ] } ] }
//! ```

use crate::models::CrawlReport;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `report` as pretty-printed JSON to `destination`.
#[instrument(level = "info", skip_all, fields(path = %destination.display()))]
pub async fn write_report_json(
    report: &CrawlReport,
    destination: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(report)?;

    if let Err(e) = fs::write(destination, json).await {
        error!(error = %e, "Failed to write JSON report");
        return Err(e.into());
    }
    info!(months = report.len(), "Wrote JSON report");
    Ok(())
}
