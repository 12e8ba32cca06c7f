//! On-disk preview cache keyed by the remote file name.
//!
//! The file at [`ContentCache::cached_file_path`] is the only record of a cache
//! entry. There is no index: if the file exists it is returned as-is, without
//! checking that it still matches the remote resource. Two different URLs that
//! end in the same file name share one entry.

use crate::traits::{IconCache, MediaFetcher};
use crate::CacheError;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;
use uuid::Uuid;

const GIF_SIGNATURE: &[u8] = b"GIF";
const GIF_HEADER_LEN: usize = 6;

pub struct ContentCache<F> {
    directory: PathBuf,
    fetcher: F,
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<F> ContentCache<F>
where
    F: MediaFetcher + Send + Sync,
{
    /// Creates the cache directory (and parents) up front.
    pub fn new(directory: impl Into<PathBuf>, fetcher: F) -> Result<Self, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;

        Ok(Self {
            directory,
            fetcher,
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn cached_file_path(&self, url: &Url) -> Result<PathBuf, CacheError> {
        Ok(self.directory.join(file_name_for(url)?))
    }

    async fn fetch_and_store(&self, url: &Url, path: &Path) -> Result<(), CacheError> {
        let response = self.fetcher.fetch(url).await?;
        if response.status != StatusCode::OK {
            return Err(CacheError::RemoteFetch {
                status_code: response.status.as_u16(),
            });
        }

        if !is_gif(&response.body) {
            return Err(CacheError::InvalidContent {
                url: url.to_string(),
            });
        }

        persist_atomically(path, &response.body).await
    }

    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut in_flight = self.in_flight.lock().await;
        in_flight
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_key(&self, key: &str, lock: Arc<Mutex<()>>) {
        let mut in_flight = self.in_flight.lock().await;
        // One reference in the map plus ours means nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            in_flight.remove(key);
        }
    }
}

#[async_trait]
impl<F> IconCache for ContentCache<F>
where
    F: MediaFetcher + Send + Sync,
{
    async fn ensure_cached(&self, url: &Url) -> Result<PathBuf, CacheError> {
        let key = file_name_for(url)?;
        let path = self.directory.join(&key);

        if is_present(&path).await {
            debug!(path = %path.display(), "cache hit");
            return Ok(path);
        }

        let lock = self.key_lock(&key).await;
        let outcome = {
            let _guard = lock.lock().await;
            if is_present(&path).await {
                debug!(path = %path.display(), "cache filled by concurrent fetch");
                Ok(())
            } else {
                debug!(url = %url, path = %path.display(), "cache miss");
                self.fetch_and_store(url, &path).await
            }
        };
        self.release_key(&key, lock).await;

        outcome.map(|()| path)
    }
}

fn file_name_for(url: &Url) -> Result<String, CacheError> {
    url.path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CacheError::UnnamedResource {
            url: url.to_string(),
        })
}

fn is_gif(bytes: &[u8]) -> bool {
    bytes.len() >= GIF_HEADER_LEN && bytes.starts_with(GIF_SIGNATURE)
}

async fn is_present(path: &Path) -> bool {
    fs::try_exists(path).await.unwrap_or(false)
}

async fn persist_atomically(path: &Path, bytes: &[u8]) -> Result<(), CacheError> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!("{file_name}.{}.tmp", Uuid::new_v4().simple()));

    let written = async {
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, path).await
    }
    .await;

    if let Err(error) = written {
        let _ = fs::remove_file(&temp_path).await;
        return Err(CacheError::Persistence(error));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MediaResponse;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::tempdir;

    const GIF_BYTES: &[u8] = b"GIF89a\x01\x00\x01\x00\x00\x00\x00;";

    struct CountingFetcher {
        status: StatusCode,
        body: Vec<u8>,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl CountingFetcher {
        fn new(status: StatusCode, body: &[u8]) -> Self {
            Self {
                status,
                body: body.to_vec(),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MediaFetcher for CountingFetcher {
        async fn fetch(&self, _url: &Url) -> Result<MediaResponse, CacheError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            Ok(MediaResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    fn media_url(name: &str) -> Url {
        Url::parse(&format!("https://media.tenor.com/abc/{name}")).expect("valid test url")
    }

    fn dir_entries(path: &Path) -> Vec<String> {
        std::fs::read_dir(path)
            .expect("readable cache dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn construction_creates_nested_directory() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let nested = dir.path().join("a").join("b");
        let cache = ContentCache::new(&nested, CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;
        assert!(nested.is_dir());
        assert_eq!(cache.directory(), nested.as_path());
        Ok(())
    }

    #[test]
    fn construction_fails_when_directory_cannot_be_created() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file")?;

        let result = ContentCache::new(
            blocker.join("cache"),
            CountingFetcher::new(StatusCode::OK, GIF_BYTES),
        );
        assert!(matches!(result, Err(CacheError::Persistence(_))));
        Ok(())
    }

    #[test]
    fn path_uses_last_url_segment() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(dir.path(), CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;
        let path = cache.cached_file_path(&media_url("tiny.gif"))?;
        assert_eq!(path, dir.path().join("tiny.gif"));
        Ok(())
    }

    #[tokio::test]
    async fn second_call_is_served_from_disk() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(dir.path(), CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;
        let url = media_url("nano.gif");

        let first = cache.ensure_cached(&url).await?;
        let second = cache.ensure_cached(&url).await?;

        assert_eq!(first, second);
        assert_eq!(cache.fetcher.calls(), 1);
        assert_eq!(std::fs::read(&first)?, GIF_BYTES);
        assert_eq!(dir_entries(dir.path()), vec!["nano.gif".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_calls_for_same_name_fetch_once() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let mut fetcher = CountingFetcher::new(StatusCode::OK, GIF_BYTES);
        fetcher.delay = Duration::from_millis(30);
        let cache = ContentCache::new(dir.path(), fetcher)?;
        let url = media_url("shared.gif");

        let (left, right) = tokio::join!(cache.ensure_cached(&url), cache.ensure_cached(&url));

        assert_eq!(left?, right?);
        assert_eq!(cache.fetcher.calls(), 1);
        assert!(cache.in_flight.lock().await.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn existing_file_is_trusted_without_fetching() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        std::fs::write(dir.path().join("stale.gif"), b"whatever was there")?;
        let cache = ContentCache::new(dir.path(), CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;

        let path = cache.ensure_cached(&media_url("stale.gif")).await?;

        assert_eq!(std::fs::read(path)?, b"whatever was there");
        assert_eq!(cache.fetcher.calls(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn non_gif_payload_is_rejected_and_not_committed() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(
            dir.path(),
            CountingFetcher::new(StatusCode::OK, b"\x89PNG\r\n\x1a\n"),
        )?;

        let result = cache.ensure_cached(&media_url("fake.gif")).await;

        assert!(matches!(result, Err(CacheError::InvalidContent { .. })));
        assert!(dir_entries(dir.path()).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn short_payload_with_gif_prefix_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(dir.path(), CountingFetcher::new(StatusCode::OK, b"GIF"))?;

        let result = cache.ensure_cached(&media_url("short.gif")).await;

        assert!(matches!(result, Err(CacheError::InvalidContent { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn server_error_is_reported_with_status() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(
            dir.path(),
            CountingFetcher::new(StatusCode::INTERNAL_SERVER_ERROR, GIF_BYTES),
        )?;

        let result = cache.ensure_cached(&media_url("down.gif")).await;

        assert!(matches!(
            result,
            Err(CacheError::RemoteFetch { status_code: 500 })
        ));
        assert!(dir_entries(dir.path()).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn write_failure_leaves_no_temporary_file() -> Result<(), Box<dyn std::error::Error>> {
        let root = tempdir()?;
        let cache_dir = root.path().join("cache");
        let cache = ContentCache::new(&cache_dir, CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;
        std::fs::remove_dir(&cache_dir)?;

        let result = cache.ensure_cached(&media_url("gone.gif")).await;

        assert!(matches!(result, Err(CacheError::Persistence(_))));
        assert_eq!(dir_entries(root.path()), Vec::<String>::new());
        Ok(())
    }

    #[tokio::test]
    async fn url_without_file_name_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;
        let cache = ContentCache::new(dir.path(), CountingFetcher::new(StatusCode::OK, GIF_BYTES))?;

        let result = cache
            .ensure_cached(&Url::parse("https://media.tenor.com/")?)
            .await;

        assert!(matches!(result, Err(CacheError::UnnamedResource { .. })));
        assert_eq!(cache.fetcher.calls(), 0);
        Ok(())
    }
}
