//! Crawl configuration.
//!
//! Every site-specific constant lives in one immutable [`CrawlConfig`] that is
//! built once at startup and handed to the fetcher and the crawler. Values can
//! be overridden from a YAML file; any field left out keeps its default.
//!
//! ```yaml
//! base_url: "http://www.pyimagesearch.com/"
//! site_title: "PyImageSearch articles"
//! default_from_year: 2014
//! output_dir: "output"
//! request_timeout_secs: 30
//! ```

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://www.pyimagesearch.com/";
pub const DEFAULT_SITE_TITLE: &str = "PyImageSearch articles";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/59.0.3071.115 Safari/537.36";
pub const DEFAULT_FROM_YEAR: i32 = 2014;
pub const MONTHS_PER_YEAR: u32 = 12;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CrawlConfig {
    /// Root of the site. Archive pages live at `<base_url>/<year>/<month>`.
    pub base_url: Url,
    /// Text of the report's banner link.
    pub site_title: String,
    /// Sent with every request; the site rejects default client identifiers.
    pub user_agent: String,
    pub months_per_year: u32,
    pub default_from_year: i32,
    /// Root for the report and the article cache.
    pub output_dir: PathBuf,
    /// Cache directory, relative to `output_dir`.
    pub articles_dir: PathBuf,
    /// Per-request timeout. Unset means no timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            site_title: DEFAULT_SITE_TITLE.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            months_per_year: MONTHS_PER_YEAR,
            default_from_year: DEFAULT_FROM_YEAR,
            output_dir: PathBuf::from("output"),
            articles_dir: PathBuf::from("articles"),
            request_timeout_secs: None,
        }
    }
}

impl CrawlConfig {
    /// Load overrides from a YAML file on top of the defaults.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml(&raw)?;
        info!(base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=12).contains(&self.months_per_year) {
            return Err(ConfigError::InvalidMonths(self.months_per_year));
        }
        if self.base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.to_string()));
        }
        Ok(())
    }

    /// Archive page URL for a year and month, without zero padding.
    pub fn archive_url(&self, year: i32, month: u32) -> String {
        let mut url = self.base_url.clone();
        // Appending to the existing path keeps any sub-path the blog lives under.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .push(&year.to_string())
                .push(&month.to_string());
        }
        url.to_string()
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.output_dir.join(&self.articles_dir)
    }

    pub fn report_path(&self, output_file: &str, extension: &str) -> PathBuf {
        self.output_dir.join(format!("{output_file}.{extension}"))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_url_has_no_zero_padding() {
        let config = CrawlConfig::default();
        assert_eq!(
            config.archive_url(2020, 3),
            "http://www.pyimagesearch.com/2020/3"
        );
        assert_eq!(
            config.archive_url(2014, 12),
            "http://www.pyimagesearch.com/2014/12"
        );
    }

    #[test]
    fn test_archive_url_keeps_sub_path() {
        let config = CrawlConfig {
            base_url: Url::parse("https://example.com/blog").unwrap(),
            ..CrawlConfig::default()
        };
        assert_eq!(config.archive_url(2021, 1), "https://example.com/blog/2021/1");
    }

    #[test]
    fn test_yaml_overrides_only_given_fields() {
        let config = CrawlConfig::from_yaml(
            "base_url: \"https://blog.example.org/\"\nrequest_timeout_secs: 15\n",
        )
        .unwrap();

        assert_eq!(config.base_url.as_str(), "https://blog.example.org/");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.months_per_year, 12);
        assert_eq!(config.default_from_year, DEFAULT_FROM_YEAR);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
    }

    #[test]
    fn test_invalid_month_count_rejected() {
        let err = CrawlConfig::from_yaml("months_per_year: 13\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMonths(13)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CrawlConfig::from_yaml("base_ulr: \"https://x.org\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_paths_are_rooted_in_output_dir() {
        let config = CrawlConfig::default();
        assert_eq!(config.cache_dir(), PathBuf::from("output/articles"));
        assert_eq!(
            config.report_path("index", "html"),
            PathBuf::from("output/index.html")
        );
    }
}
