use crate::traits::IconCache;
use crate::{Config, EnrichedItem, ItemIcon, ItemMods, ModAction, SearchResult};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

pub const VIEW_URL_BASE: &str = "https://tenor.com/view/";

/// Turns ranked search results into launcher items, one concurrent task per
/// result, and hands them back in the order they were given.
pub struct EnrichmentCoordinator<C> {
    config: Arc<Config>,
    cache: Arc<C>,
}

impl<C> EnrichmentCoordinator<C>
where
    C: IconCache + Send + Sync + 'static,
{
    pub fn new(config: Config, cache: C) -> Self {
        Self::from_shared(Arc::new(config), Arc::new(cache))
    }

    pub fn from_shared(config: Arc<Config>, cache: Arc<C>) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Never fails: per-result problems end up as a fallback icon and a
    /// warning, so the output always has one item per input result.
    pub async fn enrich(&self, results: &[SearchResult]) -> Vec<EnrichedItem> {
        let mut units = JoinSet::new();
        for (index, result) in results.iter().cloned().enumerate() {
            let config = Arc::clone(&self.config);
            let cache = Arc::clone(&self.cache);
            units.spawn(async move {
                let icon_path = resolve_icon(&result, &config, cache.as_ref()).await;
                (index, build_item(&result, &config, icon_path))
            });
        }

        let mut buffer = Vec::with_capacity(results.len());
        while let Some(joined) = units.join_next().await {
            match joined {
                Ok(indexed) => buffer.push(indexed),
                Err(error) => warn!(%error, "enrichment task did not complete"),
            }
        }

        if buffer.len() < results.len() {
            let mut completed = vec![false; results.len()];
            for (index, _) in &buffer {
                completed[*index] = true;
            }
            for (index, result) in results.iter().enumerate() {
                if !completed[index] {
                    let item = build_item(result, &self.config, self.config.fallback_icon_path());
                    buffer.push((index, item));
                }
            }
        }

        buffer.sort_by_key(|(index, _)| *index);
        debug!(item_count = buffer.len(), "enrichment completed");
        buffer.into_iter().map(|(_, item)| item).collect()
    }
}

async fn resolve_icon<C>(result: &SearchResult, config: &Config, cache: &C) -> String
where
    C: IconCache + ?Sized,
{
    let Some(preview_url) = result.media_url(&config.preview_quality) else {
        warn!(
            id = %result.id,
            quality = %config.preview_quality,
            "no preview url for this quality; using fallback icon"
        );
        return config.fallback_icon_path();
    };

    if !config.cache_enabled {
        return config.fallback_icon_path();
    }

    match cache.ensure_cached(preview_url).await {
        Ok(path) => path.to_string_lossy().to_string(),
        Err(error) => {
            warn!(id = %result.id, %error, "failed to cache icon; using fallback icon");
            config.fallback_icon_path()
        }
    }
}

pub fn view_url(id: &str) -> String {
    format!("{VIEW_URL_BASE}{id}")
}

/// Derives every presentation field of a result once its icon is known.
///
/// The primary action prefers the output-quality URL, then the item page, then
/// the preview URL, and finally a view URL built from the result id.
pub fn build_item(result: &SearchResult, config: &Config, icon_path: String) -> EnrichedItem {
    let output_url = result
        .media_url(&config.output_quality)
        .map(|url| url.to_string());
    let preview_url = result
        .media_url(&config.preview_quality)
        .map(|url| url.to_string());
    let item_url = result.item_url.as_ref().map(|url| url.to_string());

    let primary = output_url
        .clone()
        .or_else(|| item_url.clone())
        .or_else(|| preview_url.clone())
        .unwrap_or_else(|| view_url(&result.id));

    let title = result
        .content_description
        .clone()
        .unwrap_or_else(|| format!("GIF Result {}", result.id));
    let subtitle = format!(
        "Select to copy URL: {}",
        if output_url.is_some() {
            config.output_quality.as_str()
        } else {
            "post"
        }
    );

    let alt = ModAction {
        valid: true,
        arg: preview_url.clone().unwrap_or_else(|| primary.clone()),
        subtitle: format!(
            "Copy {} URL: {}",
            config.preview_quality,
            preview_url.as_deref().unwrap_or("N/A")
        ),
    };
    let cmd = ModAction {
        valid: true,
        arg: item_url.clone().unwrap_or_else(|| view_url(&result.id)),
        subtitle: format!(
            "Open Tenor page: {}",
            item_url.as_deref().unwrap_or("N/A")
        ),
    };

    EnrichedItem {
        uid: Some(result.id.clone()),
        title: title.clone(),
        subtitle: Some(subtitle),
        arg: Some(primary.clone()),
        autocomplete: Some(title),
        icon: Some(ItemIcon { path: icon_path }),
        quicklookurl: Some(preview_url.unwrap_or(primary)),
        valid: true,
        mods: Some(ItemMods { alt, cmd }),
    }
}
