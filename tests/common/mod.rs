// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

#![allow(dead_code)]

use anyhow::Result;
use std::collections::VecDeque;
use tempfile::{TempDir, tempdir};
use wiremock::MockServer;

use dzen::host::{Host, Playback};
use dzen::{Config, Listing, Paths, Site};

/// Host double that records everything the dispatcher hands it.
#[derive(Default)]
pub struct RecordingHost {
    pub listings: Vec<Listing>,
    pub playbacks: Vec<Playback>,
    pub navigations: Vec<String>,
    pub inputs: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub favourites_opened: usize,
    pending: Option<String>,
}

impl RecordingHost {
    pub fn with_input(input: Option<&str>) -> Self {
        let mut host = Self::default();
        host.inputs.push_back(input.map(str::to_string));
        host
    }

    pub fn last_listing(&self) -> &Listing {
        self.listings.last().expect("no listing was rendered")
    }
}

impl Host for RecordingHost {
    fn render(&mut self, listing: Listing) -> Result<()> {
        self.listings.push(listing);
        Ok(())
    }

    fn input(&mut self, heading: &str) -> Result<Option<String>> {
        self.prompts.push(heading.to_string());
        Ok(self.inputs.pop_front().flatten())
    }

    fn resolve(&mut self, playback: Playback) -> Result<()> {
        self.playbacks.push(playback);
        Ok(())
    }

    fn navigate(&mut self, url: &str) {
        self.navigations.push(url.to_string());
        self.pending = Some(url.to_string());
    }

    fn open_favourites(&mut self) -> Result<()> {
        self.favourites_opened += 1;
        Ok(())
    }

    fn next_navigation(&mut self) -> Option<String> {
        self.pending.take()
    }
}

/// Site pointed at `server`, with state under a fresh temp directory.
pub fn site_for(server: &MockServer) -> (TempDir, Site) {
    let dir = tempdir().unwrap();
    let paths = Paths::at(dir.path().join("data"), dir.path().join("config")).unwrap();
    let mut config = Config::default();
    config.site.scheme = "http".to_string();
    config.site.domain = server.address().to_string();
    let site = Site::new(config, paths).unwrap();
    (dir, site)
}
