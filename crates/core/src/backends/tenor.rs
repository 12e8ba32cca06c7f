use crate::traits::GifSearch;
use crate::{ApiKey, AutocompleteResponse, Config, SearchError, SearchResponse, SearchResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::debug;
use url::Url;

/// Client for the Tenor v2 search and autocomplete endpoints.
pub struct TenorClient {
    client: Client,
    api_base: Url,
    api_key: ApiKey,
    limit: u32,
    media_filter: String,
}

impl TenorClient {
    pub fn new(config: &Config) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &Config) -> Self {
        Self {
            client,
            api_base: with_trailing_slash(config.api_base.clone()),
            api_key: config.api_key.clone(),
            limit: config.limit,
            media_filter: format!("{},{}", config.preview_quality, config.output_quality),
        }
    }

    pub fn search_url(&self, query: &str) -> Result<Url, SearchError> {
        let mut url = self.api_base.join("search")?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("key", self.api_key.as_str())
            .append_pair("limit", &self.limit.to_string())
            .append_pair("media_filter", &self.media_filter);
        Ok(url)
    }

    pub fn autocomplete_url(&self, query: &str) -> Result<Url, SearchError> {
        let mut url = self.api_base.join("autocomplete")?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.as_str())
            .append_pair("q", query);
        Ok(url)
    }

    pub async fn autocomplete(&self, query: &str) -> Result<Vec<String>, SearchError> {
        let response = self.client.get(self.autocomplete_url(query)?).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::RemoteFetch {
                status_code: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        decode_autocomplete_body(&body)
    }
}

#[async_trait]
impl GifSearch for TenorClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let response = self.client.get(self.search_url(query)?).send().await?;
        ensure_search_status(response.status())?;

        let body = response.bytes().await?;
        let results = decode_search_body(&body)?;
        debug!(query, result_count = results.len(), "search completed");
        Ok(results)
    }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn ensure_search_status(status: StatusCode) -> Result<(), SearchError> {
    if status != StatusCode::OK {
        return Err(SearchError::RemoteFetch {
            status_code: status.as_u16(),
        });
    }
    Ok(())
}

pub fn decode_search_body(body: &[u8]) -> Result<Vec<SearchResult>, SearchError> {
    serde_json::from_slice::<SearchResponse>(body)
        .map(|response| response.results)
        .map_err(|error| SearchError::Decode(error.to_string()))
}

pub fn decode_autocomplete_body(body: &[u8]) -> Result<Vec<String>, SearchError> {
    serde_json::from_slice::<AutocompleteResponse>(body)
        .map(|response| response.results)
        .map_err(|error| SearchError::Decode(error.to_string()))
}
