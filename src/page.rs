// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! The paginated listing pipeline shared by every content section.
//!
//! An [`Adapter`] knows how to build the remote URL for its section and
//! how to turn one remote element into a [`MenuItem`]. [`PageEngine`] does
//! the rest: cache lookup and refresh, pagination items, cache writes and
//! handing the finished [`Listing`] to the host.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::host::Host;
use crate::nav::{NavParams, get_url};
use crate::site::Site;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// One page of remote elements, as fetched or as cached
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    #[serde(default)]
    pub data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl PageResult {
    /// Maps a remote listing payload (`items`, `more.link`, `prev.link`).
    /// Payloads without items give an empty page.
    pub fn from_listing(payload: &Value) -> Self {
        let items = match payload.get("items").and_then(Value::as_array) {
            Some(items) if !items.is_empty() => items.clone(),
            _ => return Self::default(),
        };

        let link = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.get("link"))
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            data: items,
            pagination: Some(Pagination {
                next: link("more"),
                prev: link("prev"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMenuEntry {
    pub label: String,
    pub url: String,
}

fn video_kind() -> String {
    "video".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    pub is_folder: bool,
    pub is_playable: bool,
    pub url: String,
    #[serde(default)]
    pub info: BTreeMap<String, String>,
    #[serde(default)]
    pub art: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cast: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_menu: Vec<ContextMenuEntry>,
    #[serde(default = "video_kind")]
    pub kind: String,
}

impl MenuItem {
    pub fn new(id: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            is_folder: false,
            is_playable: false,
            url: url.into(),
            info: BTreeMap::new(),
            art: BTreeMap::new(),
            cast: None,
            context_menu: Vec::new(),
            kind: video_kind(),
        }
    }

    /// Navigation entry with its label as plot
    pub fn folder(id: &str, label: &str, url: impl Into<String>) -> Self {
        let mut item = Self::new(id, label, url);
        item.is_folder = true;
        item.info("plot", label)
    }

    pub fn playable(mut self) -> Self {
        self.is_playable = true;
        self
    }

    pub fn info(mut self, key: &str, value: impl Into<String>) -> Self {
        self.info.insert(key.to_string(), value.into());
        self
    }

    /// Empty values are skipped
    pub fn art(mut self, key: &str, value: &str) -> Self {
        if !value.is_empty() {
            self.art.insert(key.to_string(), value.to_string());
        }
        self
    }
}

/// Everything the host needs to show one directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub title: String,
    pub content: String,
    pub items: Vec<MenuItem>,
}

pub fn title_case(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Per-section behaviour plugged into [`PageEngine`].
#[allow(async_fn_in_trait)]
pub trait Adapter {
    /// Context name used in navigation URLs and cache keys
    fn name(&self) -> &'static str;

    fn load_url(&self, site: &Site, params: &NavParams) -> String;

    fn element_item(&self, site: &Site, params: &NavParams, element: &Value) -> Option<MenuItem>;

    fn root_item(&self, _site: &Site) -> Option<MenuItem> {
        None
    }

    async fn fetch(&self, site: &Site, params: &NavParams) -> PageResult {
        let url = self.load_url(site, params);
        debug!("Loading data from {}", url);
        PageResult::from_listing(&site.request_json(&url).await)
    }

    async fn preload(&self, _site: &Site, _params: &NavParams) -> Result<()> {
        Ok(())
    }

    async fn postload(&self, _site: &Site, _params: &NavParams, _items: &mut Vec<MenuItem>) -> Result<()> {
        Ok(())
    }

    fn title(&self, _params: &NavParams) -> String {
        title_case(self.name())
    }

    fn content(&self, params: &NavParams) -> String {
        params.content().unwrap_or("videos").to_string()
    }

    fn cache_enabled(&self) -> bool {
        true
    }

    fn cache_prefix(&self, _params: &NavParams) -> String {
        self.name().to_string()
    }

    /// URL of another page of the same listing
    fn nav_url(&self, site: &Site, params: &NavParams, load_url: Option<&str>, offset: u32) -> String {
        let offset = offset.to_string();
        let mut pairs = vec![("action", params.action()), ("context", self.name())];
        if let Some(load_url) = load_url {
            pairs.push(("load_url", load_url));
        }
        pairs.push(("offset", offset.as_str()));
        pairs.push(("url", site.base_url.as_str()));
        get_url(&site.base_url, &pairs)
    }

    fn context_menu(&self, _site: &Site, _params: &NavParams, _item: &MenuItem) -> Vec<ContextMenuEntry> {
        Vec::new()
    }
}

pub struct PageEngine<'a> {
    site: &'a Site,
    params: &'a NavParams,
}

impl<'a> PageEngine<'a> {
    pub fn new(site: &'a Site, params: &'a NavParams) -> Self {
        Self { site, params }
    }

    fn caching<A: Adapter>(&self, adapter: &A) -> bool {
        self.site.config.cache.enabled && adapter.cache_enabled()
    }

    /// Cached page if allowed and valid, otherwise a fresh fetch. A refresh
    /// request purges the section first and never reads the cache.
    pub async fn data_query<A: Adapter>(&self, adapter: &A, prefix: &str, key: &str) -> Result<PageResult> {
        let cache = &self.site.cache;

        if self.params.refresh() {
            cache.invalidate_matching(prefix)?;
        } else if self.caching(adapter)
            && let Some(cached) = cache.get(key, self.site.cache_expire(self.params))
        {
            return Ok(cached);
        }

        Ok(adapter.fetch(self.site, self.params).await)
    }

    /// Builds the full listing: previous, home, elements, next.
    pub async fn build<A: Adapter>(&self, adapter: &A) -> Result<Listing> {
        let site = self.site;
        let params = self.params;

        adapter.preload(site, params).await?;

        let prefix = adapter.cache_prefix(params);
        let offset = params.offset();
        let key = CacheStore::key_for(&prefix, params.limit(), offset);
        debug!("Cache file name: {}", key);

        let data = self.data_query(adapter, &prefix, &key).await?;
        debug!("Items per page: {}", data.data.len());

        let title = adapter.title(params);
        let pagination = data.pagination.clone().unwrap_or_default();

        let mut items = Vec::new();

        if let Some(prev) = pagination.prev.as_deref()
            && offset > 0
        {
            let page = format!("Page {}", offset);
            items.push(
                MenuItem::folder("previous", "Previous page", adapter.nav_url(site, params, Some(prev), offset - 1))
                    .info("plot", page),
            );
        }

        if data.pagination.is_some() {
            items.push(
                MenuItem::folder("home", "Home", site.base_url.clone())
                    .info("plot", "Return to the main menu"),
            );
        }

        for element in &data.data {
            match adapter.element_item(site, params, element) {
                Some(item) => items.push(item),
                None => warn!("Skipping malformed {} element: {}", adapter.name(), element),
            }
        }

        if !data.data.is_empty() && self.caching(adapter) {
            if let Err(e) = site.cache.put(&key, &data, site.cache_expire(params)) {
                warn!("Failed to cache {}: {:#}", key, e);
            }
        }

        // No next page past the last representable offset
        if let Some(next) = pagination.next.as_deref()
            && let Some(next_offset) = offset.checked_add(1)
        {
            let page = format!("Page {}", u64::from(next_offset) + 1);
            items.push(
                MenuItem::folder("next", "Next page", adapter.nav_url(site, params, Some(next), next_offset))
                    .info("plot", page),
            );
        }

        adapter.postload(site, params, &mut items).await?;

        let refresh = self.caching(adapter).then(|| ContextMenuEntry {
            label: "Refresh".to_string(),
            url: format!("{}&refresh=true", adapter.nav_url(site, params, None, 0)),
        });
        for item in &mut items {
            let mut entries: Vec<ContextMenuEntry> = refresh.iter().cloned().collect();
            entries.extend(adapter.context_menu(site, params, item));
            item.context_menu.extend(entries);
        }

        Ok(Listing {
            title,
            content: adapter.content(params),
            items,
        })
    }

    pub async fn load<A: Adapter>(&self, adapter: &A, host: &mut dyn Host) -> Result<()> {
        let listing = self.build(adapter).await?;
        host.render(listing)
    }
}
