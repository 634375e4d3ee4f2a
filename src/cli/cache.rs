// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::Result;
use dzen::CacheStore;

pub enum CacheCommand {
    List,
    Clear,
}

impl CacheCommand {
    pub fn execute(self, context: CommandContext) -> Result<()> {
        let cache = CacheStore::new(context.paths.data_dir.clone());

        match self {
            Self::List => {
                let entries = cache.entries()?;
                if entries.is_empty() {
                    println!("Cache is empty");
                    return Ok(());
                }

                let max_age = context.config.cache.expire_seconds;
                for entry in &entries {
                    let state = if max_age > 0 && entry.age.as_secs() > max_age {
                        "expired"
                    } else {
                        "fresh"
                    };
                    println!(
                        "{:<40} {:>8} bytes {:>6}s  {}",
                        entry.key,
                        entry.size,
                        entry.age.as_secs(),
                        state
                    );
                }
                eprintln!("{} cached page(s)", entries.len());
            }
            Self::Clear => {
                let removed = cache.clear()?;
                println!("Cache cleared ({} page(s) removed)", removed);
            }
        }

        Ok(())
    }
}
