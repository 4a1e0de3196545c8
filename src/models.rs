//! Data models for crawled articles and the consolidated report.
//!
//! - [`ArticleRecord`]: one article found on an archive page
//! - [`MonthResult`]: every article found for a single (year, month)
//! - [`CrawlReport`]: all non-empty months, in crawl order

use serde::{Deserialize, Serialize};

/// A single article entry scraped from a monthly archive page.
///
/// # Fields
///
/// * `name` - The article title, also the cache key
/// * `url` - The remote article URL, or the local cached copy once saved
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// Display title taken from the anchor's `title` attribute. Never empty.
    pub name: String,
    /// Absolute remote URL, or a path relative to the output root after caching.
    pub url: String,
}

impl ArticleRecord {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// The articles listed for one (year, month) archive page, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct MonthResult {
    pub year: i32,
    pub month: u32,
    pub articles: Vec<ArticleRecord>,
}

impl MonthResult {
    pub fn new(year: i32, month: u32, articles: Vec<ArticleRecord>) -> Self {
        Self {
            year,
            month,
            articles,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    /// Heading label used in the report, e.g. `2020.3`.
    pub fn label(&self) -> String {
        format!("{}.{}", self.year, self.month)
    }
}

/// All months that yielded at least one article.
///
/// Months are kept in the order they were pushed, which the crawler
/// guarantees is ascending by year then month. Writers must not reorder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CrawlReport {
    months: Vec<MonthResult>,
}

impl CrawlReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a month. Empty months are dropped.
    pub fn push(&mut self, month: MonthResult) {
        if month.is_empty() {
            return;
        }
        debug_assert!(
            self.months
                .last()
                .is_none_or(|last| (last.year, last.month) < (month.year, month.month)),
            "months must be pushed in ascending order"
        );
        self.months.push(month);
    }

    pub fn months(&self) -> &[MonthResult] {
        &self.months
    }

    pub fn len(&self) -> usize {
        self.months.len()
    }

    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Total number of articles across all months.
    pub fn article_count(&self) -> usize {
        self.months.iter().map(|m| m.articles.len()).sum()
    }
}

impl<'a> IntoIterator for &'a CrawlReport {
    type Item = &'a MonthResult;
    type IntoIter = std::slice::Iter<'a, MonthResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.months.iter()
    }
}
