// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_ID: &str = "dzen";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:101.0) Gecko/20100101 Firefox/101.0";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub account: AccountConfig,
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub player: PlayerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub domain: String,
    pub scheme: String,
    pub api_path: String,
    pub country_code: String,
    pub user_agent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    /// Empty means anonymous browsing
    pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    /// Zero keeps cached pages forever
    pub expire_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Zero leaves requests unbounded
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub command: String,
    pub args: Vec<String>,
    /// Extra arguments passed only for HLS manifests
    pub hls_args: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub page_size: usize,
    pub search_history_size: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            domain: "dzen.ru".to_string(),
            scheme: "https".to_string(),
            api_path: "/api/v3".to_string(),
            country_code: "ru".to_string(),
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expire_seconds: 3600,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            command: "mpv".to_string(),
            args: vec!["--force-window=immediate".to_string()],
            hls_args: vec!["--hls-bitrate=max".to_string()],
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            search_history_size: 20,
        }
    }
}

impl SiteConfig {
    pub fn host_url(&self) -> String {
        format!("{}://{}", self.scheme, self.domain)
    }

    pub fn api_url(&self) -> String {
        format!("{}{}", self.host_url(), self.api_path)
    }

    /// Page harvested for the anonymous session cookie
    pub fn registration_url(&self) -> String {
        format!("{}/video", self.host_url())
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;

        Ok(config)
    }

    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Config {
        if !path.as_ref().exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            eprintln!("Warning: Could not load config file, using defaults: {e:#}");
            Self::default()
        })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content =
            toml::to_string_pretty(self).with_context(|| "Failed to serialize config to TOML")?;

        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|p| p.join(APP_ID).join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

/// Filesystem locations used during one run
#[derive(Debug, Clone)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub history_dir: PathBuf,
    pub config_dir: PathBuf,
}

impl Paths {
    /// Uses the platform data directory unless `data_dir` is given.
    pub fn resolve(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => dirs::data_dir()
                .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?
                .join(APP_ID)
                .join("data"),
        };
        let config_dir = dirs::config_dir()
            .map(|p| p.join(APP_ID))
            .unwrap_or_else(|| data_dir.clone());
        Self::at(data_dir, config_dir)
    }

    pub fn at(data_dir: PathBuf, config_dir: PathBuf) -> Result<Self> {
        let history_dir = data_dir.join("history");
        for dir in [&data_dir, &history_dir, &config_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(Self {
            data_dir,
            history_dir,
            config_dir,
        })
    }

    pub fn cookies_file(&self) -> PathBuf {
        self.data_dir.join("cookies.json")
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join("users.json")
    }

    pub fn favourites_file(&self) -> PathBuf {
        self.config_dir.join("favourites.json")
    }
}
