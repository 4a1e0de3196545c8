//! Page scrapers.
//!
//! Scrapers are pure functions from a fetched document to structured
//! records. They never touch the network or the filesystem; the crawler
//! feeds them bytes from [`crate::fetcher`].
//!
//! | Page | Module | Produces |
//! |------|--------|----------|
//! | Monthly archive listing | [`archive`] | article titles and URLs, pagination hint |

pub mod archive;
