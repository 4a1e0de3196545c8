//! Month-by-month archive crawl.
//!
//! The crawler walks every (year, month) pair in ascending order, one
//! request at a time:
//!
//! 1. Build `<base_url>/<year>/<month>` and fetch it
//! 2. Parse the archive page into article records
//! 3. Optionally cache each article and point its URL at the local copy
//! 4. Append non-empty months to the [`CrawlReport`]
//!
//! A month that cannot be fetched or parsed contributes nothing and the walk
//! moves on. Nothing is retried, and later pages of a paginated month are
//! only reported in the log.

use crate::cache::ArticleCache;
use crate::config::CrawlConfig;
use crate::error::MonthError;
use crate::fetcher::Fetch;
use crate::models::{ArticleRecord, CrawlReport, MonthResult};
use crate::scrapers::archive::parse_archive;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Counters collected over a single [`Crawler::run`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CrawlStats {
    pub months_visited: usize,
    pub months_failed: usize,
    pub months_paginated: usize,
    pub malformed_articles: usize,
    pub articles: usize,
    pub cached: usize,
    pub cache_failures: usize,
}

pub struct Crawler<F> {
    config: Arc<CrawlConfig>,
    fetcher: F,
    cache: ArticleCache<F>,
    stats: CrawlStats,
}

impl<F: Fetch + Clone> Crawler<F> {
    pub fn new(config: Arc<CrawlConfig>, fetcher: F) -> Self {
        let cache = ArticleCache::new(config.cache_dir(), config.output_dir.clone(), fetcher.clone());
        Self {
            config,
            fetcher,
            cache,
            stats: CrawlStats::default(),
        }
    }

    /// Statistics from the most recent run.
    pub fn stats(&self) -> CrawlStats {
        self.stats
    }

    /// Crawl every month of `from_year..=to_year` and return the collected
    /// report. An inverted range yields an empty report.
    #[instrument(level = "info", skip(self))]
    pub async fn run(&mut self, from_year: i32, to_year: i32, cache_enabled: bool) -> CrawlReport {
        let t0 = Instant::now();
        self.stats = CrawlStats::default();
        let mut report = CrawlReport::new();

        for year in from_year..=to_year {
            for month in 1..=self.config.months_per_year {
                self.stats.months_visited += 1;
                match self.crawl_month(year, month, cache_enabled).await {
                    Ok(result) if result.is_empty() => {
                        debug!(year, month, "No articles this month");
                    }
                    Ok(result) => {
                        info!(year, month, count = result.articles.len(), "Crawled month");
                        report.push(result);
                    }
                    Err(MonthError::Fetch(e)) => {
                        self.stats.months_failed += 1;
                        warn!(year, month, error = %e, "Archive page unavailable; skipping month");
                    }
                    Err(MonthError::Parse(e)) => {
                        self.stats.months_failed += 1;
                        warn!(year, month, error = %e, "Archive page unreadable; skipping month");
                    }
                }
            }
        }

        let elapsed = t0.elapsed();
        info!(
            months = report.len(),
            articles = report.article_count(),
            visited = self.stats.months_visited,
            failed = self.stats.months_failed,
            paginated = self.stats.months_paginated,
            malformed = self.stats.malformed_articles,
            cached = self.stats.cached,
            cache_failures = self.stats.cache_failures,
            secs = elapsed.as_secs(),
            "Crawl complete"
        );
        report
    }

    /// Fetch and parse a single archive page.
    #[instrument(level = "info", skip(self))]
    pub async fn crawl_month(
        &mut self,
        year: i32,
        month: u32,
        cache_enabled: bool,
    ) -> Result<MonthResult, MonthError> {
        let url = self.config.archive_url(year, month);
        info!(%url, "Crawling archive page");

        let body = self.fetcher.fetch(&url).await?;
        let page = parse_archive(&body)?;

        for malformed in &page.malformed {
            warn!(year, month, error = %malformed, "Skipping malformed article element");
        }
        self.stats.malformed_articles += page.malformed.len();

        if page.has_more_pages {
            self.stats.months_paginated += 1;
            warn!(
                year,
                month,
                "Archive has more pages for this month; only the first page is crawled"
            );
        }

        let mut articles = Vec::with_capacity(page.articles.len());
        for record in page.articles {
            let record = self.resolve(record);
            let record = if cache_enabled {
                self.cache_article(record).await
            } else {
                record
            };
            articles.push(record);
        }
        self.stats.articles += articles.len();

        Ok(MonthResult::new(year, month, articles))
    }

    /// Make relative article links absolute against the site root.
    /// Absolute links are kept exactly as the page wrote them.
    fn resolve(&self, mut record: ArticleRecord) -> ArticleRecord {
        match Url::parse(&record.url) {
            Ok(_) => {}
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                match self.config.base_url.join(&record.url) {
                    Ok(absolute) => record.url = absolute.to_string(),
                    Err(e) => {
                        debug!(url = %record.url, error = %e, "Keeping unresolvable article URL")
                    }
                }
            }
            Err(e) => debug!(url = %record.url, error = %e, "Keeping unparsable article URL"),
        }
        record
    }

    async fn cache_article(&mut self, mut record: ArticleRecord) -> ArticleRecord {
        match self.cache.ensure_cached(&record.name, &record.url).await {
            Ok(path) => {
                self.stats.cached += 1;
                record.url = self.cache.href_for(&path);
            }
            Err(e) => {
                self.stats.cache_failures += 1;
                warn!(name = %record.name, url = %record.url, error = %e, "Article not cached; keeping remote URL");
            }
        }
        record
    }
}
