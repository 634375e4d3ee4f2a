// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

//! The application that shows listings and plays media.

pub mod console;
pub mod terminal;

pub use console::ConsoleHost;
pub use terminal::TerminalHost;

use anyhow::Result;
use serde::Serialize;

use crate::page::Listing;

pub const HLS_MIME_TYPE: &str = "application/x-mpegURL";

/// A resolved media URL handed to the host player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Playback {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub mime_type: String,
    /// Set for HLS manifests so the player can use adaptive streaming
    pub hls: bool,
}

impl Playback {
    pub fn new(url: &str, headers: Vec<(String, String)>) -> Self {
        Self {
            url: url.to_string(),
            headers,
            mime_type: HLS_MIME_TYPE.to_string(),
            hls: url.contains(".m3u8"),
        }
    }
}

pub trait Host {
    /// Shows a finished listing. Acts as the end-of-directory signal.
    fn render(&mut self, listing: Listing) -> Result<()>;

    /// Modal text input. `None` when cancelled.
    fn input(&mut self, heading: &str) -> Result<Option<String>>;

    /// Starts playback of a resolved item.
    fn resolve(&mut self, playback: Playback) -> Result<()>;

    /// Asks the host to open another navigation URL after this one.
    fn navigate(&mut self, url: &str);

    fn open_favourites(&mut self) -> Result<()>;

    /// URL the host wants dispatched next, if any
    fn next_navigation(&mut self) -> Option<String>;
}
