use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use tracing::{debug, warn};

use crate::error::SlidecastResult;
use crate::run::query_slug;

const SEARCH_URL: &str = "https://api.unsplash.com/photos/random";
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Collaborator boundary: given a free-text query, fetch the bytes of zero or
/// one landscape photo. Failures here are always non-fatal to the caller.
pub trait ImageSearch {
    fn fetch_landscape(&self, query: &str) -> SlidecastResult<Option<Vec<u8>>>;
}

/// Unsplash random-photo client with a fixed request timeout.
pub struct UnsplashClient {
    http: reqwest::blocking::Client,
    access_key: String,
}

impl UnsplashClient {
    pub fn new(access_key: impl Into<String>) -> SlidecastResult<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(SEARCH_TIMEOUT)
            .build()
            .context("build image-search http client")?;
        Ok(Self {
            http,
            access_key: access_key.into(),
        })
    }
}

impl ImageSearch for UnsplashClient {
    fn fetch_landscape(&self, query: &str) -> SlidecastResult<Option<Vec<u8>>> {
        #[derive(serde::Deserialize)]
        struct PhotoUrls {
            regular: String,
        }
        #[derive(serde::Deserialize)]
        struct Photo {
            urls: PhotoUrls,
        }

        let resp = self
            .http
            .get(SEARCH_URL)
            .query(&[
                ("query", query),
                ("orientation", "landscape"),
                ("client_id", &self.access_key),
            ])
            .send()
            .with_context(|| format!("image search request for '{query}'"))?;

        if !resp.status().is_success() {
            debug!("image search for '{query}' returned {}", resp.status());
            return Ok(None);
        }

        let photo: Photo = resp
            .json()
            .with_context(|| format!("parse image search response for '{query}'"))?;

        let bytes = self
            .http
            .get(&photo.urls.regular)
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("download background image for '{query}'"))?
            .bytes()
            .with_context(|| format!("read background image bytes for '{query}'"))?;

        Ok(Some(bytes.to_vec()))
    }
}

/// Search stub used when no image-search credential is configured; every
/// slide takes the solid fallback background.
pub struct NoSearch;

impl ImageSearch for NoSearch {
    fn fetch_landscape(&self, _query: &str) -> SlidecastResult<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// Per-run background cache. Keys are the slugged query plus the slide
/// index; once a key is populated it is never refetched within the run.
pub struct BackgroundCache<'a> {
    dir: &'a Path,
}

impl<'a> BackgroundCache<'a> {
    pub fn new(dir: &'a Path) -> Self {
        Self { dir }
    }

    /// Resolve a cached or freshly fetched background for `query`, returning
    /// `None` on any miss or failure (the degraded path, never an error).
    pub fn resolve(
        &self,
        search: &dyn ImageSearch,
        query: &str,
        slide_index: usize,
    ) -> Option<PathBuf> {
        let path = self
            .dir
            .join(format!("{}_{}.jpg", query_slug(query), slide_index + 1));
        if path.exists() {
            return Some(path);
        }

        match search.fetch_landscape(query) {
            Ok(Some(bytes)) => {
                if let Err(e) = std::fs::write(&path, &bytes) {
                    warn!("failed to cache background '{}': {e}", path.display());
                    return None;
                }
                Some(path)
            }
            Ok(None) => {
                debug!("no background found for '{query}'");
                None
            }
            Err(e) => {
                warn!("background fetch failed for '{query}': {e:#}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct CountingSearch {
        calls: Cell<usize>,
        result: Option<Vec<u8>>,
    }

    impl ImageSearch for CountingSearch {
        fn fetch_landscape(&self, _query: &str) -> SlidecastResult<Option<Vec<u8>>> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.result.clone())
        }
    }

    struct FailingSearch;

    impl ImageSearch for FailingSearch {
        fn fetch_landscape(&self, _query: &str) -> SlidecastResult<Option<Vec<u8>>> {
            Err(anyhow::anyhow!("network unreachable").into())
        }
    }

    #[test]
    fn cache_hit_skips_refetch() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BackgroundCache::new(tmp.path());
        let search = CountingSearch {
            calls: Cell::new(0),
            result: Some(vec![1, 2, 3]),
        };

        let first = cache.resolve(&search, "water cycle", 0).unwrap();
        let second = cache.resolve(&search, "water cycle", 0).unwrap();
        assert_eq!(first, second);
        assert_eq!(search.calls.get(), 1);
        assert_eq!(std::fs::read(&first).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn distinct_slide_indices_get_distinct_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BackgroundCache::new(tmp.path());
        let search = CountingSearch {
            calls: Cell::new(0),
            result: Some(vec![9]),
        };

        let a = cache.resolve(&search, "topic", 0).unwrap();
        let b = cache.resolve(&search, "topic", 1).unwrap();
        assert_ne!(a, b);
        assert_eq!(search.calls.get(), 2);
    }

    #[test]
    fn search_failure_degrades_to_none() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = BackgroundCache::new(tmp.path());
        assert!(cache.resolve(&FailingSearch, "anything", 0).is_none());
    }
}
