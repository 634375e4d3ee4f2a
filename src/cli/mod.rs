// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use std::io::{self, Stdout};

use dzen::favourites::FavouritesManager;
use dzen::host::ConsoleHost;
use dzen::{Config, Paths, Player, Site};

pub mod cache;
pub mod open;
pub mod search;
pub mod session;

pub use cache::CacheCommand;
pub use dzen::host::console::OutputFormat;
pub use open::OpenCommand;
pub use search::SearchCommand;
pub use session::SessionCommand;

/// Configuration and file locations shared by the scriptable commands
pub struct CommandContext {
    pub config: Config,
    pub paths: Paths,
}

impl CommandContext {
    pub fn new(config: Config, paths: Paths) -> Self {
        Self { config, paths }
    }

    /// Opens the site, registering a session if none is stored yet.
    pub async fn open_site(&self) -> Result<Site> {
        Site::open(self.config.clone(), self.paths.clone()).await
    }

    pub fn favourites(&self) -> FavouritesManager {
        FavouritesManager::new(self.paths.favourites_file())
    }

    pub fn player(&self) -> Player {
        Player::new(self.config.player.clone())
    }

    /// Console host on stdout; `play` hands resolved videos to the player.
    pub fn console_host(&self, format: OutputFormat, play: bool) -> ConsoleHost<Stdout> {
        let player = play.then(|| self.player());
        ConsoleHost::new(io::stdout(), format, player, self.favourites())
    }
}
