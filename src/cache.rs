//! On-disk cache of full article pages.
//!
//! Each article is stored once as `<cache_dir>/<sanitized name>.html`. The
//! presence of that file is the whole cache entry: there is no invalidation
//! and no content comparison, so an article saved by an earlier run is never
//! downloaded again while the directory survives.
//!
//! Within a run every name gets at most one fetch attempt. A name that
//! failed is remembered and not retried.

use crate::error::CacheError;
use crate::fetcher::Fetch;
use crate::utils::sanitize_file_name;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::collections::HashSet;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tokio::fs;
use tracing::{debug, info, instrument};
use url::Url;

/// Bytes escaped in each segment of a cached-article link.
const HREF_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

pub struct ArticleCache<F> {
    dir: PathBuf,
    /// Directory the report lives in; cached paths are linked relative to it.
    link_root: PathBuf,
    fetcher: F,
    failed: Mutex<HashSet<String>>,
}

impl<F: Fetch> ArticleCache<F> {
    pub fn new(dir: impl Into<PathBuf>, link_root: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            dir: dir.into(),
            link_root: link_root.into(),
            fetcher,
            failed: Mutex::new(HashSet::new()),
        }
    }

    /// Local file an article with this name is cached at.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.html", sanitize_file_name(name)))
    }

    /// Link to a cached file from the report's directory.
    ///
    /// Each segment is percent-encoded so titles containing `#`, `%` or `?`
    /// still point at the right file. Falls back to a `file://` URL when the
    /// cache lives outside the report directory.
    pub fn href_for(&self, path: &Path) -> String {
        match path.strip_prefix(&self.link_root) {
            Ok(relative) => relative
                .components()
                .map(|c| utf8_percent_encode(&c.as_os_str().to_string_lossy(), HREF_SEGMENT).to_string())
                .collect::<Vec<_>>()
                .join("/"),
            Err(_) => Url::from_file_path(path)
                .map(|url| url.to_string())
                .unwrap_or_else(|()| path.display().to_string()),
        }
    }

    /// Make sure the article page for `name` is on disk and return its path.
    ///
    /// Returns immediately if the file already exists. Otherwise creates the
    /// cache directory if needed, downloads `url` and writes the body.
    #[instrument(level = "info", skip(self))]
    pub async fn ensure_cached(&self, name: &str, url: &str) -> Result<PathBuf, CacheError> {
        let path = self.path_for(name);

        if fs::try_exists(&path).await.unwrap_or(false) {
            debug!(path = %path.display(), "Article already cached");
            return Ok(path);
        }

        if self.has_failed(name) {
            return Err(CacheError::PreviouslyFailed {
                name: name.to_string(),
            });
        }

        let result = self.download(&path, url).await;
        if result.is_err() {
            self.mark_failed(name);
        }
        result.map(|()| path)
    }

    async fn download(&self, path: &Path, url: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;

        let body = self.fetcher.fetch(url).await?;

        let created = persist_new(&self.dir, path, &body).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        if created {
            info!(path = %path.display(), bytes = body.len(), "Saved article");
        } else {
            debug!(path = %path.display(), "Article cached concurrently; keeping existing file");
        }
        Ok(())
    }

    fn has_failed(&self, name: &str) -> bool {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(name)
    }

    fn mark_failed(&self, name: &str) {
        self.failed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string());
    }
}

/// Write `body` to a temp file in `dir` and move it to `path` only once it
/// is complete. `path` never holds a partial body.
///
/// Returns `false` when `path` already exists; the existing file is kept.
fn persist_new(dir: &Path, path: &Path, body: &[u8]) -> std::io::Result<bool> {
    let mut tmp = tempfile::Builder::new()
        .prefix(".partial-")
        .suffix(".html")
        .tempfile_in(dir)?;
    tmp.write_all(body)?;
    tmp.flush()?;

    match tmp.persist_noclobber(path) {
        Ok(_) => Ok(true),
        Err(e) if e.error.kind() == ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.error),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted [`Fetch`] double. Unknown URLs fail with a 404.
    #[derive(Clone, Default)]
    pub(crate) struct MockFetcher {
        pages: Arc<HashMap<String, Vec<u8>>>,
        calls: Arc<Mutex<Vec<String>>>,
        count: Arc<AtomicUsize>,
    }

    impl MockFetcher {
        pub(crate) fn with_pages<I, K, V>(pages: I) -> Self
        where
            I: IntoIterator<Item = (K, V)>,
            K: Into<String>,
            V: Into<Vec<u8>>,
        {
            Self {
                pages: Arc::new(
                    pages
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into()))
                        .collect(),
                ),
                ..Self::default()
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.count.load(Ordering::SeqCst)
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Fetch for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
            self.count.fetch_add(1, Ordering::SeqCst);
            self.calls.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: reqwest::StatusCode::NOT_FOUND,
                })
        }
    }

    const ARTICLE_URL: &str = "https://blog.example/face-detection/";

    fn cache_in(root: &Path, fetcher: MockFetcher) -> ArticleCache<MockFetcher> {
        ArticleCache::new(root.join("articles"), root, fetcher)
    }

    #[tokio::test]
    async fn test_saves_article_body() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, "<html>face</html>")]);
        let cache = cache_in(tmp.path(), fetcher.clone());

        let path = cache.ensure_cached("Face detection", ARTICLE_URL).await.unwrap();

        assert_eq!(path, tmp.path().join("articles").join("Face detection.html"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "<html>face</html>");
        assert_eq!(cache.href_for(&path), "articles/Face%20detection.html");
    }

    #[tokio::test]
    async fn test_same_name_is_fetched_once() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, "<html>face</html>")]);
        let cache = cache_in(tmp.path(), fetcher.clone());

        let first = cache.ensure_cached("Face detection", ARTICLE_URL).await.unwrap();
        let second = cache.ensure_cached("Face detection", ARTICLE_URL).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.call_count(), 1);
    }

    #[tokio::test]
    async fn test_existing_file_from_earlier_run_is_reused() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("articles")).unwrap();
        std::fs::write(tmp.path().join("articles/Face detection.html"), "old copy").unwrap();

        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, "new copy")]);
        let cache = cache_in(tmp.path(), fetcher.clone());
        let path = cache.ensure_cached("Face detection", ARTICLE_URL).await.unwrap();

        assert_eq!(fetcher.call_count(), 0);
        assert_eq!(std::fs::read_to_string(path).unwrap(), "old copy");
    }

    #[tokio::test]
    async fn test_failed_name_is_not_retried() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::default();
        let cache = cache_in(tmp.path(), fetcher.clone());

        let first = cache.ensure_cached("Gone", "https://blog.example/gone/").await;
        assert!(matches!(first, Err(CacheError::Fetch(FetchError::Status { .. }))));

        let second = cache.ensure_cached("Gone", "https://blog.example/gone/").await;
        assert!(matches!(second, Err(CacheError::PreviouslyFailed { .. })));
        assert_eq!(fetcher.call_count(), 1);
        assert!(!cache.path_for("Gone").exists());
    }

    #[tokio::test]
    async fn test_unsafe_name_stays_inside_cache_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, "body")]);
        let cache = cache_in(tmp.path(), fetcher);

        let path = cache.ensure_cached("../../escape/attempt", ARTICLE_URL).await.unwrap();

        assert_eq!(path.parent().unwrap(), tmp.path().join("articles"));
        assert_eq!(path.file_name().unwrap(), "_.._escape_attempt.html");
    }

    #[tokio::test]
    async fn test_cache_dir_creation_failure() {
        let tmp = tempfile::tempdir().unwrap();
        // A regular file where the cache directory should go.
        std::fs::write(tmp.path().join("articles"), "not a dir").unwrap();
        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, "body")]);
        let cache = cache_in(tmp.path(), fetcher.clone());

        let err = cache.ensure_cached("Face detection", ARTICLE_URL).await.unwrap_err();

        assert!(matches!(err, CacheError::CreateDir { .. }));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[test]
    fn test_href_outside_link_root_is_file_url() {
        let cache = ArticleCache::new("/srv/cache", "/home/me/output", MockFetcher::default());
        assert_eq!(
            cache.href_for(Path::new("/srv/cache/C# notes.html")),
            "file:///srv/cache/C%23%20notes.html"
        );
    }

    #[test]
    fn test_href_escapes_reserved_characters() {
        let cache = ArticleCache::new("/out/articles", "/out", MockFetcher::default());
        let path = cache.path_for("C# vs Python: 100% speed?");
        assert_eq!(
            cache.href_for(&path),
            "articles/C%23%20vs%20Python_%20100%25%20speed_.html"
        );
    }

    fn leftover_temp_files(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|p| p.file_name().unwrap().to_string_lossy().starts_with(".partial-"))
            .collect()
    }

    #[test]
    fn test_failed_persist_leaves_no_file() {
        let tmp = tempfile::tempdir().unwrap();
        // The final rename fails because the target's directory is missing.
        let target = tmp.path().join("missing").join("Big.html");

        let err = persist_new(tmp.path(), &target, &vec![b'x'; 1 << 20]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(!target.exists());
        assert!(leftover_temp_files(tmp.path()).is_empty());
    }

    #[test]
    fn test_persist_keeps_existing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("Face detection.html");
        std::fs::write(&target, "first writer").unwrap();

        let created = persist_new(tmp.path(), &target, b"second writer").unwrap();

        assert!(!created);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first writer");
        assert!(leftover_temp_files(tmp.path()).is_empty());
    }

    #[tokio::test]
    async fn test_saved_article_is_complete_and_no_temp_remains() {
        let tmp = tempfile::tempdir().unwrap();
        let body = "<p>frame</p>".repeat(100_000);
        let fetcher = MockFetcher::with_pages([(ARTICLE_URL, body.clone())]);
        let cache = cache_in(tmp.path(), fetcher);

        let path = cache.ensure_cached("Big", ARTICLE_URL).await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), body);
        assert!(leftover_temp_files(&tmp.path().join("articles")).is_empty());
    }

    #[tokio::test]
    async fn test_failed_names_survive_poisoned_lock() {
        let tmp = tempfile::tempdir().unwrap();
        let fetcher = MockFetcher::default();
        let cache = cache_in(tmp.path(), fetcher.clone());

        assert!(cache.ensure_cached("Gone", "https://blog.example/gone/").await.is_err());
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = cache.failed.lock().unwrap();
            panic!("panic while holding the failed-name lock");
        }));
        assert!(cache.failed.is_poisoned());

        let second = cache.ensure_cached("Gone", "https://blog.example/gone/").await;

        assert!(matches!(second, Err(CacheError::PreviouslyFailed { .. })));
        assert_eq!(fetcher.call_count(), 1);
    }
}
