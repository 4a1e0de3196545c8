//! Monthly archive page parser.
//!
//! An archive page lists the posts published in one month. Each post is an
//! `<article>` element whose title link sits at `header > … h2 > … a`:
//!
//! ```html
//! <article>
//!   <header>
//!     <h2><a href="https://blog.example/post/" title="Post title">Post title</a></h2>
//!   </header>
//! </article>
//! ```
//!
//! The anchor's `title` attribute is the article name and its `href` is the
//! article URL. A page with a `.pagination` container has further pages that
//! are reported but never followed.

use crate::error::ParseError;
use crate::models::ArticleRecord;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());
static HEADER: Lazy<Selector> = Lazy::new(|| Selector::parse("header").unwrap());
static HEADING: Lazy<Selector> = Lazy::new(|| Selector::parse("h2").unwrap());
static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static PAGINATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.pagination, nav.pagination").unwrap());

/// Everything extracted from one archive page.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ArchivePage {
    /// Well-formed articles in document order.
    pub articles: Vec<ArticleRecord>,
    /// One entry per `<article>` element that was skipped.
    pub malformed: Vec<ParseError>,
    /// The page links to further pages for the same month.
    pub has_more_pages: bool,
}

/// Parse a monthly archive page.
///
/// Articles missing the header > h2 > anchor structure, or whose anchor has
/// no usable `title`/`href`, are skipped and recorded in
/// [`ArchivePage::malformed`] instead of failing the page.
///
/// # Errors
///
/// [`ParseError::Encoding`] if the document is not UTF-8.
pub fn parse_archive(document: &[u8]) -> Result<ArchivePage, ParseError> {
    let text = std::str::from_utf8(document)?;
    let html = Html::parse_document(text);

    let mut page = ArchivePage {
        has_more_pages: html.select(&PAGINATION).next().is_some(),
        ..ArchivePage::default()
    };

    for (index, article) in html.select(&ARTICLE).enumerate() {
        match parse_article(article) {
            Ok(record) => page.articles.push(record),
            Err(missing) => page
                .malformed
                .push(ParseError::MalformedArticle { index, missing }),
        }
    }

    Ok(page)
}

fn parse_article(article: ElementRef<'_>) -> Result<ArticleRecord, &'static str> {
    let anchor = article
        .select(&HEADER)
        .next()
        .ok_or("a header")?
        .select(&HEADING)
        .next()
        .ok_or("an h2 heading")?
        .select(&ANCHOR)
        .next()
        .ok_or("a title link")?;

    let name = anchor
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or("a title attribute")?;
    let url = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or("an href attribute")?;

    Ok(ArticleRecord::new(name, url))
}
