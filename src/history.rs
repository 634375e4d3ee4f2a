// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct SearchHistoryData {
    searches: Vec<String>,
}

/// Search terms and played items kept under the history directory
#[derive(Debug, Clone)]
pub struct History {
    dir: PathBuf,
    search_limit: usize,
}

impl History {
    pub fn new(dir: PathBuf, search_limit: usize) -> Self {
        Self { dir, search_limit }
    }

    fn searches_path(&self) -> PathBuf {
        self.dir.join("searches.json")
    }

    fn brand_path(&self, id: &str) -> PathBuf {
        self.dir.join(format!("brand_{}.json", id))
    }

    /// Most recent first. An unreadable file reads as empty.
    pub fn searches(&self) -> Vec<String> {
        let path = self.searches_path();
        let Ok(content) = fs::read_to_string(&path) else {
            return Vec::new();
        };
        match serde_json::from_str::<SearchHistoryData>(&content) {
            Ok(data) => data.searches,
            Err(e) => {
                warn!("Ignoring unreadable search history {}: {}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Moves `term` to the front, dropping older duplicates (ignoring case).
    pub fn add_search(&self, term: &str) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        let mut searches = self.searches();
        let lowered = term.to_lowercase();
        searches.retain(|s| s.to_lowercase() != lowered);
        searches.insert(0, term.to_string());
        searches.truncate(self.search_limit.max(1));

        self.write_searches(searches)
    }

    fn write_searches(&self, searches: Vec<String>) -> Result<()> {
        let path = self.searches_path();
        let content = serde_json::to_string_pretty(&SearchHistoryData { searches })
            .with_context(|| "Failed to serialize search history")?;
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create history directory: {}", self.dir.display()))?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write search history: {}", path.display()))?;
        Ok(())
    }

    /// Stores a played item record as `brand_<id>.json`.
    pub fn save_brand(&self, brand: &Value) -> Result<PathBuf> {
        let id = match brand.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => anyhow::bail!("History record has no id"),
        };
        if id.contains(['/', '\\']) || id.starts_with('.') {
            anyhow::bail!("Invalid history id: {}", id);
        }

        let path = self.brand_path(&id);
        let content =
            serde_json::to_string(brand).with_context(|| "Failed to serialize history record")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write history record: {}", path.display()))?;
        Ok(path)
    }
}
