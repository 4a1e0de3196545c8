//! Error kinds for each stage of a crawl.
//!
//! The crawl distinguishes failures by where they happen so the driver can
//! decide, per kind, whether to absorb them or stop:
//!
//! | Error | Raised by | Policy |
//! |-------|-----------|--------|
//! | [`FetchError`] | [`crate::fetcher`] | absorbed per month / per article |
//! | [`ParseError`] | [`crate::scrapers::archive`] | absorbed per month / per element |
//! | [`CacheError`] | [`crate::cache`] | absorbed per article, remote URL kept |
//! | [`ConfigError`] | [`crate::config`], [`crate::cli`] | fatal, exit status 1 |

use std::path::PathBuf;
use thiserror::Error;

/// Failure to retrieve a page over HTTP.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    /// Transport-level failure (DNS, connect, TLS, body read, timeout).
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with a non-2xx status.
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Failure to interpret an archive page.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The page body is not valid UTF-8; the whole page is unusable.
    #[error("archive page is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    /// One `<article>` element lacks the header > h2 > a structure.
    #[error("article element #{index} is missing {missing}")]
    MalformedArticle { index: usize, missing: &'static str },
}

/// Failure to persist an article page locally.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to download article: {0}")]
    Fetch(#[from] FetchError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// An earlier attempt for this name failed during this run.
    #[error("article {name:?} already failed to cache in this run")]
    PreviouslyFailed { name: String },
}

/// Invalid settings discovered at startup. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("year {year} is in the future (current year is {current})")]
    FutureYear { year: i32, current: i32 },
    #[error("from year {from} is after to year {to}")]
    InvertedRange { from: i32, to: i32 },
    #[error("months_per_year must be between 1 and 12, got {0}")]
    InvalidMonths(u32),
    #[error("base URL {0} cannot be used as a base for archive paths")]
    InvalidBaseUrl(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Why a single month produced no articles.
#[derive(Debug, Error)]
pub enum MonthError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}
