pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod pipeline;
pub mod traits;

pub use backends::{HttpMediaFetcher, TenorClient};
pub use cache::ContentCache;
pub use config::{ApiKey, Config, PLACEHOLDER_API_KEY};
pub use error::{CacheError, SearchError};
pub use models::{
    AutocompleteResponse, CacheHint, EnrichedItem, ItemIcon, ItemMods, LauncherOutput,
    MediaFormat, ModAction, SearchResponse, SearchResult,
};
pub use orchestrator::{build_item, EnrichmentCoordinator};
pub use pipeline::{autocomplete_output, failure_output, usage_output, SearchPipeline};
pub use traits::{GifSearch, IconCache, MediaFetcher, MediaResponse};
