//! HTML index of every crawled month.
//!
//! The document is deliberately minimal so it opens anywhere:
//!
//! ```html
//! <html>
//! <body>
//! <h1><a href="http://www.pyimagesearch.com/">PyImageSearch articles</a></h1>
//! <h2>2020.3</h2>
//! <p><a href="https://...">Article name</a></p>
//!
//! </body>
//! </html>
//! ```
//!
//! Lines end with `\r\n`. Months appear exactly in report order.

use crate::config::CrawlConfig;
use crate::models::CrawlReport;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::Write;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const EOL: &str = "\r\n";

/// Render the report as a standalone HTML document.
///
/// The banner links to `config.base_url` with `config.site_title` as text.
pub fn render_report(report: &CrawlReport, config: &CrawlConfig) -> String {
    let mut html = String::new();
    html.push_str("<html>");
    html.push_str(EOL);
    html.push_str("<body>");
    html.push_str(EOL);
    write!(
        html,
        "<h1><a href=\"{}\">{}</a></h1>{EOL}",
        encode_double_quoted_attribute(config.base_url.as_str()),
        encode_text(&config.site_title)
    )
    .unwrap();

    for month in report {
        write!(html, "<h2>{}</h2>{EOL}", month.label()).unwrap();
        for article in &month.articles {
            write!(
                html,
                "<p><a href=\"{}\">{}</a></p>{EOL}",
                encode_double_quoted_attribute(&article.url),
                encode_text(&article.name)
            )
            .unwrap();
        }
        html.push_str(EOL);
    }

    html.push_str("</body>");
    html.push_str(EOL);
    html.push_str("</html>");
    html.push_str(EOL);
    html
}

/// Render the report and write it to `destination`, replacing any
/// existing file.
#[instrument(level = "info", skip_all, fields(path = %destination.display()))]
pub async fn write_report(
    report: &CrawlReport,
    config: &CrawlConfig,
    destination: &Path,
) -> std::io::Result<()> {
    let html = render_report(report, config);
    fs::write(destination, html).await?;
    info!(
        months = report.len(),
        articles = report.article_count(),
        "Wrote HTML report"
    );
    Ok(())
}
