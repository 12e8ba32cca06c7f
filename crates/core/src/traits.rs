use crate::{CacheError, SearchError, SearchResult};
use async_trait::async_trait;
use reqwest::StatusCode;
use std::path::PathBuf;
use url::Url;

#[async_trait]
pub trait GifSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}

/// Raw outcome of a single media download; validation is left to the caller.
#[derive(Debug, Clone)]
pub struct MediaResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[async_trait]
pub trait MediaFetcher {
    async fn fetch(&self, url: &Url) -> Result<MediaResponse, CacheError>;
}

#[async_trait]
pub trait IconCache {
    async fn ensure_cached(&self, url: &Url) -> Result<PathBuf, CacheError>;
}
