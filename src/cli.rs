//! Command-line interface definitions.
//!
//! # Examples
//!
//! ```sh
//! # Index every month since the configured default year
//! archive_crawler pyimagesearch
//!
//! # Save every article for offline reading, starting in 2018
//! archive_crawler pyimagesearch --offline --from-year 2018
//!
//! # Crawl a different blog described in a YAML file
//! archive_crawler myblog --config ./myblog.yaml --json
//! ```

use crate::error::ConfigError;
use clap::Parser;

/// Crawl the articles' names and URLs.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Name of the output file, written as `<output_dir>/<OUTPUT_FILE>.html`
    pub output_file: String,

    /// Save every article page for offline reading
    #[arg(long)]
    pub offline: bool,

    /// The year from which to crawl articles (default: config `default_from_year`)
    #[arg(long)]
    pub from_year: Option<i32>,

    /// The last year to crawl, inclusive (default: the current year)
    #[arg(long)]
    pub to_year: Option<i32>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "ARCHIVE_CRAWLER_CONFIG")]
    pub config: Option<String>,

    /// Also write the report as `<output_dir>/<OUTPUT_FILE>.json`
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Resolve and validate the inclusive year range to crawl.
    ///
    /// Neither end may lie after `current_year`, and the range must not be
    /// inverted.
    pub fn year_range(
        &self,
        default_from_year: i32,
        current_year: i32,
    ) -> Result<(i32, i32), ConfigError> {
        let from = self.from_year.unwrap_or(default_from_year);
        let to = self.to_year.unwrap_or(current_year);

        for year in [from, to] {
            if year > current_year {
                return Err(ConfigError::FutureYear {
                    year,
                    current: current_year,
                });
            }
        }
        if from > to {
            return Err(ConfigError::InvertedRange { from, to });
        }
        Ok((from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_defaults() {
        let cli = Cli::parse_from(["archive_crawler", "articles"]);

        assert_eq!(cli.output_file, "articles");
        assert!(!cli.offline);
        assert!(!cli.json);
        assert_eq!(cli.from_year, None);
        assert_eq!(cli.to_year, None);
    }

    #[test]
    fn test_cli_all_flags() {
        let cli = Cli::parse_from([
            "archive_crawler",
            "articles",
            "--offline",
            "--from-year",
            "2016",
            "--to-year",
            "2018",
            "--config",
            "./crawl.yaml",
            "--json",
        ]);

        assert!(cli.offline);
        assert!(cli.json);
        assert_eq!(cli.from_year, Some(2016));
        assert_eq!(cli.to_year, Some(2018));
        assert_eq!(cli.config.as_deref(), Some("./crawl.yaml"));
    }

    #[test]
    fn test_output_file_is_required() {
        assert!(Cli::try_parse_from(["archive_crawler"]).is_err());
    }

    #[test]
    fn test_year_range_defaults() {
        let cli = Cli::parse_from(["archive_crawler", "articles"]);
        assert_eq!(cli.year_range(2014, 2021).unwrap(), (2014, 2021));
    }

    #[test]
    fn test_future_from_year_rejected() {
        let cli = Cli::parse_from(["archive_crawler", "articles", "--from-year", "2030"]);
        let err = cli.year_range(2014, 2021).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::FutureYear {
                year: 2030,
                current: 2021
            }
        ));
    }

    #[test]
    fn test_future_to_year_rejected() {
        let cli = Cli::parse_from(["archive_crawler", "articles", "--to-year", "2022"]);
        assert!(matches!(
            cli.year_range(2014, 2021),
            Err(ConfigError::FutureYear { year: 2022, .. })
        ));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let cli = Cli::parse_from([
            "archive_crawler",
            "articles",
            "--from-year",
            "2020",
            "--to-year",
            "2019",
        ]);
        assert!(matches!(
            cli.year_range(2014, 2021),
            Err(ConfigError::InvertedRange { from: 2020, to: 2019 })
        ));
    }

    #[test]
    fn test_current_year_is_allowed() {
        let cli = Cli::parse_from(["archive_crawler", "articles", "--from-year", "2021"]);
        assert_eq!(cli.year_range(2014, 2021).unwrap(), (2021, 2021));
    }
}
