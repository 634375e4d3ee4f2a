// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde_json::Value;

use super::{VideoElement, video_item};
use crate::nav::{NavParams, get_url};
use crate::page::{Adapter, MenuItem};
use crate::site::Site;

pub struct VideosAdapter;

impl VideosAdapter {
    /// Default feed endpoint
    pub fn feed_url(site: &Site) -> String {
        get_url(
            &format!("{}/launcher/video-more", site.api_url()),
            &[("country_code", &site.config.site.country_code)],
        )
    }
}

impl Adapter for VideosAdapter {
    fn name(&self) -> &'static str {
        "videos"
    }

    fn load_url(&self, site: &Site, params: &NavParams) -> String {
        match params.load_url() {
            Some(url) => url.to_string(),
            None => Self::feed_url(site),
        }
    }

    fn element_item(&self, site: &Site, _params: &NavParams, element: &Value) -> Option<MenuItem> {
        VideoElement::from_value(element).map(|e| video_item(site, self.name(), &e))
    }

    fn root_item(&self, site: &Site) -> Option<MenuItem> {
        let url = get_url(
            &site.base_url,
            &[
                ("action", "load"),
                ("context", self.name()),
                ("content", "videos"),
                ("url", &site.base_url),
            ],
        );
        Some(MenuItem::folder("channels", "Videos", url))
    }
}
