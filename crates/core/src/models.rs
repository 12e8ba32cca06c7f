use serde::{Deserialize, Serialize};
use serde_with::{serde_as, NoneAsEmptyString};
use std::collections::HashMap;
use url::Url;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

/// One ranked hit from the search API. The response order is the rank.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: String,
    #[serde(default)]
    #[serde_as(as = "NoneAsEmptyString")]
    pub content_description: Option<String>,
    #[serde(rename = "itemurl", default)]
    pub item_url: Option<Url>,
    #[serde(default)]
    pub media_formats: HashMap<String, MediaFormat>,
}

impl SearchResult {
    pub fn media_url(&self, quality: &str) -> Option<&Url> {
        self.media_formats.get(quality).map(|format| &format.url)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MediaFormat {
    pub url: Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteResponse {
    pub results: Vec<String>,
}

/// Launcher-facing record. Field names are part of the output contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EnrichedItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<ItemIcon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quicklookurl: Option<String>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mods: Option<ItemMods>,
}

impl EnrichedItem {
    /// Non-actionable item used to report "nothing found" or a failure.
    pub fn placeholder(title: impl Into<String>, subtitle: impl Into<String>) -> Self {
        Self {
            uid: None,
            title: title.into(),
            subtitle: Some(subtitle.into()),
            arg: None,
            autocomplete: None,
            icon: None,
            quicklookurl: None,
            valid: false,
            mods: None,
        }
    }

    /// Plain actionable row whose title doubles as its argument.
    pub fn suggestion(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            uid: None,
            title: text.clone(),
            subtitle: None,
            arg: Some(text),
            autocomplete: None,
            icon: None,
            quicklookurl: None,
            valid: true,
            mods: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemIcon {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemMods {
    pub alt: ModAction,
    pub cmd: ModAction,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModAction {
    pub valid: bool,
    pub arg: String,
    pub subtitle: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CacheHint {
    pub seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LauncherOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheHint>,
    pub items: Vec<EnrichedItem>,
}

impl LauncherOutput {
    pub fn new(items: Vec<EnrichedItem>) -> Self {
        Self { cache: None, items }
    }

    pub fn single(item: EnrichedItem) -> Self {
        Self::new(vec![item])
    }
}
