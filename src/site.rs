// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::config::{Config, Paths};
use crate::history::History;
use crate::nav::{BASE_URL, NavParams};
use crate::session::Session;
use crate::users::UserRegistry;

/// Everything one run needs: configuration, file locations, the HTTP
/// session and the page cache.
#[derive(Debug)]
pub struct Site {
    pub config: Config,
    pub paths: Paths,
    pub session: Session,
    pub cache: CacheStore,
    pub base_url: String,
}

impl Site {
    /// Builds the site and restores saved cookies. No network traffic.
    pub fn new(config: Config, paths: Paths) -> Result<Self> {
        let session = Session::new(&config.site, &config.http)?;
        session.load(paths.cookies_file());

        Ok(Self {
            cache: CacheStore::new(paths.data_dir.clone()),
            config,
            paths,
            session,
            base_url: BASE_URL.to_string(),
        })
    }

    /// [`Site::new`] followed by login and session registration.
    pub async fn open(config: Config, paths: Paths) -> Result<Self> {
        let mut site = Self::new(config, paths)?;

        let login = site.config.account.login.clone();
        debug!("User: {}", if login.is_empty() { "<anonymous>" } else { &login });
        if !login.is_empty() {
            let registry = UserRegistry::load(site.paths.users_file());
            match registry.find(&login) {
                Some(user) => debug!("Found local profile for {}: {:?}", login, user.extra),
                None => debug!("No local profile for {}", login),
            }
        }
        site.session.login(&login);

        let registration = site.config.site.registration_url();
        if site.session.ensure_session(&registration).await {
            site.save_session()?;
        }

        Ok(site)
    }

    pub fn save_session(&self) -> Result<()> {
        self.session.save(self.paths.cookies_file())
    }

    pub fn history(&self) -> History {
        History::new(
            self.paths.history_dir.clone(),
            self.config.ui.search_history_size,
        )
    }

    /// Expiry for this request: the `cache_expire` parameter, else config.
    pub fn cache_expire(&self, params: &NavParams) -> u64 {
        params
            .cache_expire()
            .unwrap_or(self.config.cache.expire_seconds)
    }

    pub fn api_url(&self) -> String {
        self.config.site.api_url()
    }

    /// Headers the media player must send when fetching streams
    pub fn play_headers(&self) -> Vec<(String, String)> {
        let origin = self.config.site.host_url();
        [
            ("User-Agent", self.config.site.user_agent.as_str()),
            ("Origin", origin.as_str()),
            ("Referer", origin.as_str()),
            ("Sec-Fetch-Dest", "empty"),
            ("Sec-Fetch-Mode", "cors"),
            ("Sec-Fetch-Site", "cross-site"),
            ("Sec-GPC", "1"),
            ("Connection", "keep-alive"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    async fn fetch(&self, url: &str) -> Option<Vec<u8>> {
        debug!("Query site url: {}", url);

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed_precise}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message("Loading...");
        pb.enable_steady_tick(Duration::from_millis(100));

        let result = self.session.get(url, None).await;
        pb.finish_and_clear();

        match result {
            Ok(response) if response.is_ok() => Some(response.body),
            Ok(response) => {
                warn!("Query {} returned HTTP error {}", url, response.status);
                None
            }
            Err(e) => {
                warn!("Query {} failed: {:#}", url, e);
                None
            }
        }
    }

    /// JSON body, or `{}` on any failure.
    pub async fn request_json(&self, url: &str) -> Value {
        let Some(body) = self.fetch(url).await else {
            return Value::Object(Map::new());
        };
        serde_json::from_slice(&body).unwrap_or_else(|e| {
            warn!("Query {} returned invalid JSON: {}", url, e);
            Value::Object(Map::new())
        })
    }

    /// Body as text, or an empty string on any failure.
    pub async fn request_text(&self, url: &str) -> String {
        self.fetch(url)
            .await
            .map(|body| String::from_utf8_lossy(&body).into_owned())
            .unwrap_or_default()
    }

    /// The unread response, or `None` on any failure.
    pub async fn request_stream(&self, url: &str) -> Option<reqwest::Response> {
        match self.session.get_stream(url, None).await {
            Ok(response) if response.status() == reqwest::StatusCode::OK => Some(response),
            Ok(response) => {
                warn!("Query {} returned HTTP error {}", url, response.status());
                None
            }
            Err(e) => {
                warn!("Query {} failed: {:#}", url, e);
                None
            }
        }
    }
}
