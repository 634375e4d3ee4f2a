// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{VideoElement, VideosAdapter, video_item};
use crate::host::Host;
use crate::nav::{NavParams, get_url};
use crate::page::{Adapter, Listing, MenuItem};
use crate::site::Site;

/// Keyword search over the video feed.
///
/// Query URL precedence: an explicit `load_url`, then the `search` term,
/// then the plain feed.
pub struct SearchAdapter;

impl SearchAdapter {
    pub fn search_url(site: &Site, term: &str) -> String {
        get_url(
            &format!("{}/launcher/video-search", site.api_url()),
            &[
                ("query", term),
                ("country_code", &site.config.site.country_code),
            ],
        )
    }

    /// Navigation URL of the results for `term`
    pub fn results_url(site: &Site, term: &str) -> String {
        get_url(
            &site.base_url,
            &[
                ("action", "load"),
                ("context", "search"),
                ("search", term),
                ("url", &site.base_url),
            ],
        )
    }

    pub fn history_root_item(site: &Site) -> Option<MenuItem> {
        let url = get_url(
            &site.base_url,
            &[
                ("action", "history"),
                ("context", "search"),
                ("url", &site.base_url),
            ],
        );
        Some(MenuItem::folder("history", "Search history", url))
    }

    /// Asks for a term unless the request carries one, then navigates to
    /// its results. Empty or cancelled input stops here.
    pub fn search(&self, site: &Site, params: &NavParams, host: &mut dyn Host) -> Result<()> {
        let term = match params.search() {
            Some(term) => term.trim().to_string(),
            None => host.input("Search")?.unwrap_or_default().trim().to_string(),
        };

        if term.is_empty() {
            debug!("Search cancelled");
            return Ok(());
        }

        site.history().add_search(&term)?;
        host.navigate(&Self::results_url(site, &term));
        Ok(())
    }

    pub fn history(&self, site: &Site, host: &mut dyn Host) -> Result<()> {
        let mut items: Vec<MenuItem> = self.root_item(site).into_iter().collect();
        items.extend(
            site.history()
                .searches()
                .into_iter()
                .map(|term| {
                    let url = Self::results_url(site, &term);
                    MenuItem::folder("search_term", &term, url)
                }),
        );

        host.render(Listing {
            title: "Search history".to_string(),
            content: "files".to_string(),
            items,
        })
    }
}

impl Adapter for SearchAdapter {
    fn name(&self) -> &'static str {
        "search"
    }

    fn load_url(&self, site: &Site, params: &NavParams) -> String {
        if let Some(url) = params.load_url() {
            return url.to_string();
        }
        match params.search() {
            Some(term) => Self::search_url(site, term),
            None => VideosAdapter::feed_url(site),
        }
    }

    fn element_item(&self, site: &Site, _params: &NavParams, element: &Value) -> Option<MenuItem> {
        VideoElement::from_value(element).map(|e| video_item(site, self.name(), &e))
    }

    fn root_item(&self, site: &Site) -> Option<MenuItem> {
        let url = get_url(
            &site.base_url,
            &[
                ("action", "search"),
                ("context", self.name()),
                ("url", &site.base_url),
            ],
        );
        Some(MenuItem::folder("search", "Search", url))
    }

    fn title(&self, params: &NavParams) -> String {
        match params.search() {
            Some(term) => format!("Search: {}", term),
            None => "Search".to_string(),
        }
    }

    /// Results of different terms never share cache files. The term is
    /// hashed exactly as it is sent to the server.
    fn cache_prefix(&self, params: &NavParams) -> String {
        match params.search() {
            Some(term) => {
                let mut hasher = Sha256::new();
                hasher.update(term.as_bytes());
                format!("search_{}", &format!("{:x}", hasher.finalize())[..8])
            }
            None => self.name().to_string(),
        }
    }

    /// Keeps the term so further pages share the cache prefix.
    fn nav_url(&self, site: &Site, params: &NavParams, load_url: Option<&str>, offset: u32) -> String {
        let offset = offset.to_string();
        let mut pairs = vec![("action", "load"), ("context", self.name())];
        if let Some(term) = params.search() {
            pairs.push(("search", term));
        }
        if let Some(load_url) = load_url {
            pairs.push(("load_url", load_url));
        }
        pairs.push(("offset", offset.as_str()));
        pairs.push(("url", site.base_url.as_str()));
        get_url(&site.base_url, &pairs)
    }
}
