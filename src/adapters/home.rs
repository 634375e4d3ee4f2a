// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use serde_json::Value;
use tracing::warn;

use super::{SearchAdapter, VideosAdapter};
use crate::host::Host;
use crate::nav::{NavParams, get_url};
use crate::page::{Adapter, MenuItem, PageResult};
use crate::site::Site;

/// Static root menu
pub struct HomeAdapter;

impl HomeAdapter {
    fn favourites_item(site: &Site) -> MenuItem {
        let url = get_url(
            &site.base_url,
            &[
                ("action", "favorites"),
                ("context", "home"),
                ("url", &site.base_url),
            ],
        );
        MenuItem::new("favorites", "Favourites", url).info("plot", "Favourites")
    }

    pub fn favorites(&self, host: &mut dyn Host) -> Result<()> {
        host.open_favourites()
    }
}

impl Adapter for HomeAdapter {
    fn name(&self) -> &'static str {
        "home"
    }

    fn load_url(&self, site: &Site, _params: &NavParams) -> String {
        site.base_url.clone()
    }

    async fn fetch(&self, site: &Site, _params: &NavParams) -> PageResult {
        let menu = [
            SearchAdapter.root_item(site),
            SearchAdapter::history_root_item(site),
            VideosAdapter.root_item(site),
            Some(Self::favourites_item(site)),
        ];

        let data = menu
            .into_iter()
            .flatten()
            .filter_map(|item| match serde_json::to_value(&item) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!("Failed to build menu entry {}: {}", item.id, e);
                    None
                }
            })
            .collect();

        PageResult {
            data,
            pagination: None,
        }
    }

    fn element_item(&self, _site: &Site, _params: &NavParams, element: &Value) -> Option<MenuItem> {
        serde_json::from_value(element.clone()).ok()
    }

    fn title(&self, _params: &NavParams) -> String {
        "Dzen".to_string()
    }

    fn content(&self, _params: &NavParams) -> String {
        "files".to_string()
    }

    fn cache_enabled(&self) -> bool {
        false
    }
}
