// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use tracing::warn;

/// One entry of `users.json`; fields besides the login are kept as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub yandex_login: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Local registry of known accounts
#[derive(Debug, Clone, Default)]
pub struct UserRegistry {
    users: Vec<UserRecord>,
}

impl UserRegistry {
    /// Missing or unreadable files give an empty registry.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        let users = serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!("Ignoring unreadable user registry {}: {}", path.display(), e);
            Vec::new()
        });
        Self { users }
    }

    pub fn find(&self, login: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.yandex_login == login)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn find_by_login_keeps_extra_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("users.json");
        fs::write(
            &path,
            r#"[{"yandex_login": "alice", "name": "Alice"}, {"yandex_login": "bob"}]"#,
        )
        .unwrap();

        let registry = UserRegistry::load(&path);
        assert!(registry.find("bob").unwrap().extra.is_empty());
        let alice = registry.find("alice").unwrap();
        assert_eq!(alice.extra["name"], "Alice");
        assert!(registry.find("carol").is_none());
    }

    #[test]
    fn missing_or_broken_registry_is_empty() {
        let dir = tempdir().unwrap();
        assert!(UserRegistry::load(dir.path().join("users.json")).find("alice").is_none());

        let path = dir.path().join("broken.json");
        fs::write(&path, "{").unwrap();
        assert!(UserRegistry::load(&path).find("alice").is_none());
    }
}
