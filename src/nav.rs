// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! Navigation URLs.
//!
//! Every menu item points at a `plugin://dzen/?key=value&...` URL. Hosts
//! hand those URLs back to the shell, which parses them into [`NavParams`]
//! to pick the context, the action and the page to load.

use url::{Url, form_urlencoded};

pub const BASE_URL: &str = "plugin://dzen/";

/// Builds `base?key=value&...` with every value percent-encoded. Pairs keep
/// their order.
pub fn get_url(base: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return base.to_string();
    }
    let query = params
        .iter()
        .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{base}?{query}")
}

/// Decoded query parameters of one navigation request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavParams {
    pairs: Vec<(String, String)>,
}

impl NavParams {
    /// Accepts a full navigation URL, a `?query` or a bare query string.
    pub fn parse(url: &str) -> Self {
        let query = match Url::parse(url) {
            Ok(parsed) => parsed.query().unwrap_or_default().to_string(),
            Err(_) => url.trim_start_matches('?').to_string(),
        };

        Self {
            pairs: form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        }
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            pairs: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Last value wins, like a dict built from the query.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn context(&self) -> &str {
        self.non_empty("context").unwrap_or("home")
    }

    pub fn action(&self) -> &str {
        self.non_empty("action").unwrap_or("load")
    }

    pub fn load_url(&self) -> Option<&str> {
        self.non_empty("load_url")
    }

    pub fn search(&self) -> Option<&str> {
        self.non_empty("search")
    }

    pub fn content(&self) -> Option<&str> {
        self.non_empty("content")
    }

    pub fn spath(&self) -> Option<&str> {
        self.non_empty("spath")
    }

    pub fn id(&self) -> Option<&str> {
        self.non_empty("id")
    }

    pub fn offset(&self) -> u32 {
        self.get("offset").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn limit(&self) -> u32 {
        self.get("limit").and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    pub fn refresh(&self) -> bool {
        self.get("refresh") == Some("true")
    }

    pub fn cache_expire(&self) -> Option<u64> {
        self.get("cache_expire").and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_url_encodes_values_in_order() {
        let url = get_url(
            BASE_URL,
            &[
                ("action", "load"),
                ("context", "videos"),
                ("load_url", "https://dzen.ru/api/v3/launcher/video-more?next=a&b=c"),
                ("offset", "1"),
            ],
        );
        assert_eq!(
            url,
            "plugin://dzen/?action=load&context=videos\
             &load_url=https%3A%2F%2Fdzen.ru%2Fapi%2Fv3%2Flauncher%2Fvideo-more%3Fnext%3Da%26b%3Dc\
             &offset=1"
        );
    }

    #[test]
    fn get_url_without_params_is_base() {
        assert_eq!(get_url(BASE_URL, &[]), BASE_URL);
    }

    #[test]
    fn parse_restores_built_values() {
        let url = get_url(
            BASE_URL,
            &[("context", "search"), ("search", "cats & dogs"), ("offset", "3")],
        );
        let params = NavParams::parse(&url);
        assert_eq!(params.context(), "search");
        assert_eq!(params.search(), Some("cats & dogs"));
        assert_eq!(params.offset(), 3);
        assert_eq!(params.action(), "load");
    }

    #[test]
    fn parse_handles_plus_and_bare_query() {
        let params = NavParams::parse("?search=hello+world&refresh=true");
        assert_eq!(params.search(), Some("hello world"));
        assert!(params.refresh());

        let params = NavParams::parse("context=videos&offset=oops");
        assert_eq!(params.context(), "videos");
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn base_url_defaults_to_home_load() {
        let params = NavParams::parse(BASE_URL);
        assert_eq!(params.context(), "home");
        assert_eq!(params.action(), "load");
        assert_eq!(params.load_url(), None);
        assert!(!params.refresh());
    }

    #[test]
    fn last_value_wins() {
        let params = NavParams::parse("plugin://dzen/?offset=2&context=videos&offset=5");
        assert_eq!(params.offset(), 5);
        assert_eq!(params.context(), "videos");
    }

    #[test]
    fn parse_decodes_percent_escapes_in_full_urls() {
        let params = NavParams::parse("plugin://dzen/?spath=https%3A%2F%2Fcdn.test%2Fa.m3u8%3Fx%3D1&id=v+1");
        assert_eq!(params.spath(), Some("https://cdn.test/a.m3u8?x=1"));
        assert_eq!(params.id(), Some("v 1"));
    }
}
