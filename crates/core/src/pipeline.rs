use crate::orchestrator::EnrichmentCoordinator;
use crate::traits::{GifSearch, IconCache};
use crate::{CacheHint, EnrichedItem, LauncherOutput};
use std::fmt::Display;
use tracing::{info, warn};

/// How long the launcher may reuse an autocomplete response.
pub const AUTOCOMPLETE_CACHE_SECONDS: u64 = 3600;

pub struct SearchPipeline<S, C> {
    search: S,
    coordinator: EnrichmentCoordinator<C>,
}

impl<S, C> SearchPipeline<S, C>
where
    S: GifSearch + Send + Sync,
    C: IconCache + Send + Sync + 'static,
{
    pub fn new(search: S, coordinator: EnrichmentCoordinator<C>) -> Self {
        Self {
            search,
            coordinator,
        }
    }

    /// Always produces something the launcher can show; search failures and
    /// empty result sets become a single non-actionable item.
    pub async fn run(&self, query: &str) -> LauncherOutput {
        let query = query.trim();
        if query.is_empty() {
            return usage_output();
        }

        match self.search.search(query).await {
            Err(error) => {
                warn!(query, %error, "search failed");
                failure_output("Error fetching GIFs", &error)
            }
            Ok(results) if results.is_empty() => {
                info!(query, "search returned no results");
                LauncherOutput::single(EnrichedItem::placeholder(
                    format!("No GIFs found for '{query}'"),
                    "Try a different search term.",
                ))
            }
            Ok(results) => {
                let items = self.coordinator.enrich(&results).await;
                info!(query, item_count = items.len(), "search enriched");
                LauncherOutput::new(items)
            }
        }
    }
}

pub fn failure_output(title: &str, error: &dyn Display) -> LauncherOutput {
    LauncherOutput::single(EnrichedItem::placeholder(title, error.to_string()))
}

pub fn usage_output() -> LauncherOutput {
    LauncherOutput::single(EnrichedItem::placeholder(
        "Usage: gif-search search <search term>",
        "Please provide a search term for GIFs.",
    ))
}

/// The typed query comes first so it can always be submitted as-is.
pub fn autocomplete_output(query: &str, suggestions: Vec<String>) -> LauncherOutput {
    let query = query.to_lowercase();
    let mut items = vec![EnrichedItem::suggestion(query.clone())];
    items.extend(
        suggestions
            .into_iter()
            .filter(|suggestion| *suggestion != query)
            .map(EnrichedItem::suggestion),
    );

    LauncherOutput {
        cache: Some(CacheHint {
            seconds: AUTOCOMPLETE_CACHE_SECONDS,
        }),
        items,
    }
}
