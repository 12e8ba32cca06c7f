use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no valid API key found; set the API_KEY environment variable")]
    MissingCredential,

    #[error("search request failed with status {status_code}")]
    RemoteFetch { status_code: u16 },

    #[error("failed to decode search response: {0}")]
    Decode(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("media fetch failed with status {status_code}")]
    RemoteFetch { status_code: u16 },

    #[error("downloaded content from {url} is not a GIF")]
    InvalidContent { url: String },

    #[error("cache persistence failed: {0}")]
    Persistence(#[from] std::io::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media url has no file name: {url}")]
    UnnamedResource { url: String },
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
