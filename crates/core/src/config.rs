use crate::SearchError;
use std::fmt;
use std::path::PathBuf;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://tenor.googleapis.com/v2/";
pub const DEFAULT_LIMIT: u32 = 5;
pub const DEFAULT_PREVIEW_QUALITY: &str = "nanogif";
pub const DEFAULT_OUTPUT_QUALITY: &str = "tinygif";

/// Value shipped in workflow templates before the user fills in a real key.
pub const PLACEHOLDER_API_KEY: &str = "PLACEHOLDER_API_KEY";

/// A non-empty API key that is not the template placeholder.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Result<Self, SearchError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed == PLACEHOLDER_API_KEY {
            return Err(SearchError::MissingCredential);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn from_optional(value: Option<String>) -> Result<Self, SearchError> {
        value.map_or(Err(SearchError::MissingCredential), Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keeps the key out of logs.
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Read-only inputs for the search pipeline.
///
/// Quality labels are used verbatim as keys into each result's media map; a
/// label the API does not know simply yields no URL for that quality.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: ApiKey,
    pub api_base: Url,
    pub limit: u32,
    pub preview_quality: String,
    pub output_quality: String,
    pub cache_enabled: bool,
    pub cache_dir: PathBuf,
    pub fallback_icon: PathBuf,
}

impl Config {
    pub fn new(
        api_key: ApiKey,
        cache_dir: impl Into<PathBuf>,
        fallback_icon: impl Into<PathBuf>,
    ) -> Result<Self, SearchError> {
        Ok(Self {
            api_key,
            api_base: Url::parse(DEFAULT_API_BASE)?,
            limit: DEFAULT_LIMIT,
            preview_quality: DEFAULT_PREVIEW_QUALITY.to_string(),
            output_quality: DEFAULT_OUTPUT_QUALITY.to_string(),
            cache_enabled: true,
            cache_dir: cache_dir.into(),
            fallback_icon: fallback_icon.into(),
        })
    }

    pub fn fallback_icon_path(&self) -> String {
        self.fallback_icon.to_string_lossy().to_string()
    }
}
