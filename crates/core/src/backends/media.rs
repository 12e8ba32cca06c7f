use crate::traits::{MediaFetcher, MediaResponse};
use crate::CacheError;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use url::Url;

#[derive(Debug, Clone, Default)]
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &Url) -> Result<MediaResponse, CacheError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        // The body of a failed download is never used.
        if status != StatusCode::OK {
            return Ok(MediaResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = response.bytes().await?.to_vec();
        Ok(MediaResponse { status, body })
    }
}
