// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::page::MenuItem;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Favourite {
    pub label: String,
    pub url: String,
    pub is_folder: bool,
    pub is_playable: bool,
    pub added_date: DateTime<Utc>,
}

impl Favourite {
    pub fn from_item(item: &MenuItem) -> Self {
        Self {
            label: item.label.clone(),
            url: item.url.clone(),
            is_folder: item.is_folder,
            is_playable: item.is_playable,
            added_date: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FavouritesData {
    pub favourites: Vec<Favourite>,
}

/// Host-side favourites, stored in the config directory (not the cache)
#[derive(Debug, Clone)]
pub struct FavouritesManager {
    path: PathBuf,
}

impl FavouritesManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn get_favourites(&self) -> Result<Vec<Favourite>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read favourites file: {}", self.path.display())
        })?;

        let data: FavouritesData =
            serde_json::from_str(&content).with_context(|| "Failed to parse favourites JSON")?;

        Ok(data.favourites)
    }

    pub fn save_favourites(&self, favourites: Vec<Favourite>) -> Result<()> {
        let data = FavouritesData { favourites };

        let content = serde_json::to_string_pretty(&data)
            .with_context(|| "Failed to serialize favourites")?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create favourites directory: {}", parent.display())
            })?;
        }

        fs::write(&self.path, content).with_context(|| {
            format!("Failed to write favourites file: {}", self.path.display())
        })?;

        Ok(())
    }

    /// Returns false when the URL is already a favourite.
    pub fn add_favourite(&self, favourite: Favourite) -> Result<bool> {
        let mut favourites = self.get_favourites()?;

        if favourites.iter().any(|f| f.url == favourite.url) {
            return Ok(false);
        }

        favourites.push(favourite);
        self.save_favourites(favourites)?;
        Ok(true)
    }

    pub fn remove_favourite(&self, url: &str) -> Result<()> {
        let mut favourites = self.get_favourites()?;
        favourites.retain(|f| f.url != url);
        self.save_favourites(favourites)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn add_is_unique_by_url_and_remove_works() {
        let dir = tempdir().unwrap();
        let manager = FavouritesManager::new(dir.path().join("favourites.json"));
        let item = MenuItem::new("1", "Clip", "plugin://dzen/?action=play&spath=x").playable();

        assert!(manager.add_favourite(Favourite::from_item(&item)).unwrap());
        assert!(!manager.add_favourite(Favourite::from_item(&item)).unwrap());
        let stored = manager.get_favourites().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].url, item.url);

        manager.remove_favourite(&item.url).unwrap();
        assert!(manager.get_favourites().unwrap().is_empty());
    }
}
