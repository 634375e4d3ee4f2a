// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

use crate::page::PageResult;

/// One cached page file as reported by [`CacheStore::entries`]
#[derive(Debug, Clone)]
pub struct CacheEntryInfo {
    pub key: String,
    pub age: Duration,
    pub size: u64,
}

/// Page results stored as `<prefix>_<limit>_<offset>.json` files.
///
/// The directory is shared with other state files (cookies, users), so
/// bulk operations only touch names that look like cache keys.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
}

impl CacheStore {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn key_for(prefix: &str, limit: u32, offset: u32) -> String {
        format!("{}_{}_{}.json", prefix, limit, offset)
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.cache_dir.join(key)
    }

    fn age(&self, key: &str) -> Option<Duration> {
        let modified = fs::metadata(self.path_for(key))
            .and_then(|meta| meta.modified())
            .ok()?;
        Some(
            SystemTime::now()
                .duration_since(modified)
                .unwrap_or(Duration::ZERO),
        )
    }

    /// A missing entry counts as expired. `max_age == 0` never expires.
    pub fn is_expired(&self, key: &str, max_age: u64) -> bool {
        match self.age(key) {
            None => true,
            Some(_) if max_age == 0 => false,
            Some(age) => age.as_secs() > max_age,
        }
    }

    pub fn get(&self, key: &str, max_age: u64) -> Option<PageResult> {
        if self.is_expired(key, max_age) {
            debug!("Cache miss: {}", key);
            return None;
        }

        let path = self.path_for(key);
        let content = match fs::read(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Failed to read cache file {}: {}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_slice(&content) {
            Ok(result) => {
                debug!("Loading from cache file: {}", path.display());
                Some(result)
            }
            Err(e) => {
                warn!("Ignoring corrupt cache file {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Writes only when `result` has data and no valid entry exists yet.
    /// Returns whether the file was written.
    pub fn put(&self, key: &str, result: &PageResult, max_age: u64) -> Result<bool> {
        if result.data.is_empty() || !self.is_expired(key, max_age) {
            return Ok(false);
        }

        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "Failed to create cache directory: {}",
                self.cache_dir.display()
            )
        })?;

        let path = self.path_for(key);
        let content = serde_json::to_vec(result).with_context(|| "Failed to serialize page")?;
        fs::write(&path, content)
            .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

        debug!("Cached {} elements in {}", result.data.len(), path.display());
        Ok(true)
    }

    pub fn invalidate_matching(&self, prefix: &str) -> Result<usize> {
        let removed = self.remove_where(|name| name.starts_with(prefix) && is_cache_key(name))?;
        debug!("Invalidated {} cache file(s) for prefix {}", removed, prefix);
        Ok(removed)
    }

    pub fn clear(&self) -> Result<usize> {
        self.remove_where(is_cache_key)
    }

    pub fn entries(&self) -> Result<Vec<CacheEntryInfo>> {
        let mut entries = Vec::new();
        for name in self.file_names()? {
            if !is_cache_key(&name) {
                continue;
            }
            let size = fs::metadata(self.path_for(&name))
                .map(|meta| meta.len())
                .unwrap_or(0);
            entries.push(CacheEntryInfo {
                age: self.age(&name).unwrap_or(Duration::ZERO),
                key: name,
                size,
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    fn file_names(&self) -> Result<Vec<String>> {
        if !self.cache_dir.exists() {
            return Ok(Vec::new());
        }
        let dir = fs::read_dir(&self.cache_dir).with_context(|| {
            format!("Failed to read cache directory: {}", self.cache_dir.display())
        })?;

        Ok(dir
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect())
    }

    fn remove_where(&self, matches: impl Fn(&str) -> bool) -> Result<usize> {
        let mut removed = 0;
        for name in self.file_names()? {
            if !matches(&name) {
                continue;
            }
            let path = self.path_for(&name);
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache file: {}", path.display()))?;
            removed += 1;
        }
        Ok(removed)
    }
}

/// `<prefix>_<limit>_<offset>.json` with numeric limit and offset
fn is_cache_key(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".json") else {
        return false;
    };
    let mut parts = stem.rsplitn(3, '_');
    let offset = parts.next().unwrap_or_default();
    let limit = parts.next().unwrap_or_default();
    let prefix = parts.next().unwrap_or_default();
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    !prefix.is_empty() && numeric(limit) && numeric(offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Pagination;
    use serde_json::json;
    use std::fs::File;
    use tempfile::tempdir;

    fn page(titles: &[&str]) -> PageResult {
        PageResult {
            data: titles
                .iter()
                .enumerate()
                .map(|(i, t)| json!({"id": i.to_string(), "title": t}))
                .collect(),
            pagination: Some(Pagination {
                next: Some("L2".to_string()),
                prev: None,
            }),
        }
    }

    fn age_file(store: &CacheStore, key: &str, seconds: u64) {
        File::options()
            .write(true)
            .open(store.path_for(key))
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(seconds))
            .unwrap();
    }

    #[test]
    fn key_layout() {
        assert_eq!(CacheStore::key_for("videos", 0, 0), "videos_0_0.json");
        assert_eq!(CacheStore::key_for("search_ab12", 20, 3), "search_ab12_20_3.json");
    }

    #[test]
    fn put_then_get_round_trips_bytes() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);
        let result = page(&["A", "B"]);

        assert!(store.put(&key, &result, 60).unwrap());

        let on_disk = fs::read(store.path_for(&key)).unwrap();
        assert_eq!(on_disk, serde_json::to_vec(&result).unwrap());
        assert!(store.age(&key).unwrap() < Duration::from_secs(5));

        let cached = store.get(&key, 60).unwrap();
        assert_eq!(serde_json::to_vec(&cached).unwrap(), on_disk);
    }

    #[test]
    fn expired_entry_is_a_miss() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);
        store.put(&key, &page(&["A"]), 5).unwrap();
        age_file(&store, &key, 10);

        assert!(store.is_expired(&key, 5));
        assert!(store.get(&key, 5).is_none());
        // zero never expires
        assert!(!store.is_expired(&key, 0));
        assert!(store.get(&key, 0).is_some());
    }

    #[test]
    fn put_keeps_valid_entry() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);

        assert!(store.put(&key, &page(&["first"]), 60).unwrap());
        assert!(!store.put(&key, &page(&["second"]), 60).unwrap());

        let cached = store.get(&key, 60).unwrap();
        assert_eq!(cached.data[0]["title"], "first");
    }

    #[test]
    fn put_replaces_expired_entry() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);

        store.put(&key, &page(&["first"]), 5).unwrap();
        age_file(&store, &key, 10);
        assert!(store.put(&key, &page(&["second"]), 5).unwrap());

        let cached = store.get(&key, 5).unwrap();
        assert_eq!(cached.data[0]["title"], "second");
    }

    #[test]
    fn put_skips_empty_page() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);

        assert!(!store.put(&key, &PageResult::default(), 60).unwrap());
        assert!(!store.path_for(&key).exists());
    }

    #[test]
    fn corrupt_file_is_a_miss() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        let key = CacheStore::key_for("videos", 0, 0);
        fs::write(store.path_for(&key), b"{not json").unwrap();

        assert!(store.get(&key, 0).is_none());
    }

    #[test]
    fn invalidate_removes_prefix_only() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        for offset in 0..3 {
            store
                .put(&CacheStore::key_for("videos", 0, offset), &page(&["A"]), 0)
                .unwrap();
        }
        store
            .put(&CacheStore::key_for("search_1234", 0, 0), &page(&["B"]), 0)
            .unwrap();

        assert_eq!(store.invalidate_matching("videos").unwrap(), 3);
        assert!(store.get(&CacheStore::key_for("search_1234", 0, 0), 0).is_some());
        assert!(store.get(&CacheStore::key_for("videos", 0, 1), 0).is_none());
    }

    #[test]
    fn clear_leaves_state_files() {
        let dir = tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        store
            .put(&CacheStore::key_for("videos", 0, 0), &page(&["A"]), 0)
            .unwrap();
        fs::write(dir.path().join("cookies.json"), b"[]").unwrap();
        fs::write(dir.path().join("users.json"), b"[]").unwrap();

        assert_eq!(store.entries().unwrap().len(), 1);
        assert_eq!(store.clear().unwrap(), 1);
        assert!(dir.path().join("cookies.json").exists());
        assert!(dir.path().join("users.json").exists());
    }

    #[test]
    fn cache_key_detection() {
        assert!(is_cache_key("videos_0_0.json"));
        assert!(is_cache_key("search_ab_cd_10_2.json"));
        assert!(!is_cache_key("cookies.json"));
        assert!(!is_cache_key("brand_42.json"));
        assert!(!is_cache_key("_0_0.json"));
    }
}
