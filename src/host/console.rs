// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use inquire::Text;
use serde_json::json;
use std::io::Write;

use super::{Host, Playback};
use crate::favourites::FavouritesManager;
use crate::page::Listing;
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!("Invalid format: {}. Use 'text' or 'json'", s),
        }
    }
}

/// Prints one listing and exits; used by scripted commands.
pub struct ConsoleHost<W: Write> {
    out: W,
    format: OutputFormat,
    player: Option<Player>,
    favourites: FavouritesManager,
    pending: Option<String>,
}

impl<W: Write> ConsoleHost<W> {
    /// Without a player, playback only prints the resolved URL.
    pub fn new(
        out: W,
        format: OutputFormat,
        player: Option<Player>,
        favourites: FavouritesManager,
    ) -> Self {
        Self {
            out,
            format,
            player,
            favourites,
            pending: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Host for ConsoleHost<W> {
    fn render(&mut self, listing: Listing) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                writeln!(self.out, "{}", serde_json::to_string_pretty(&listing)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.out, "== {} ({})", listing.title, listing.content)?;
                for item in &listing.items {
                    let marker = if item.is_folder {
                        "+"
                    } else if item.is_playable {
                        ">"
                    } else {
                        "-"
                    };
                    writeln!(self.out, "{} {}", marker, item.label)?;
                    writeln!(self.out, "    {}", item.url)?;
                }
            }
        }
        Ok(())
    }

    fn input(&mut self, heading: &str) -> Result<Option<String>> {
        Ok(Text::new(heading).prompt_skippable()?)
    }

    fn resolve(&mut self, playback: Playback) -> Result<()> {
        match &self.player {
            Some(player) => player.play(&playback),
            None => {
                match self.format {
                    OutputFormat::Json => {
                        writeln!(self.out, "{}", serde_json::to_string_pretty(&playback)?)?
                    }
                    OutputFormat::Text => writeln!(self.out, "{}", playback.url)?,
                }
                Ok(())
            }
        }
    }

    fn navigate(&mut self, url: &str) {
        self.pending = Some(url.to_string());
    }

    fn open_favourites(&mut self) -> Result<()> {
        let favourites = self.favourites.get_favourites()?;
        match self.format {
            OutputFormat::Json => {
                let value = json!({ "favourites": favourites });
                writeln!(self.out, "{}", serde_json::to_string_pretty(&value)?)?;
            }
            OutputFormat::Text => {
                if favourites.is_empty() {
                    writeln!(self.out, "No favourites yet.")?;
                }
                for favourite in favourites {
                    writeln!(self.out, "* {}", favourite.label)?;
                    writeln!(self.out, "    {}", favourite.url)?;
                }
            }
        }
        Ok(())
    }

    fn next_navigation(&mut self) -> Option<String> {
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::MenuItem;
    use tempfile::tempdir;

    fn host(format: OutputFormat) -> (tempfile::TempDir, ConsoleHost<Vec<u8>>) {
        let dir = tempdir().unwrap();
        let favourites = FavouritesManager::new(dir.path().join("favourites.json"));
        (dir, ConsoleHost::new(Vec::new(), format, None, favourites))
    }

    fn listing() -> Listing {
        Listing {
            title: "Videos".to_string(),
            content: "videos".to_string(),
            items: vec![
                MenuItem::new("1", "Clip", "plugin://dzen/?action=play").playable(),
                MenuItem::folder("next", "Next page", "plugin://dzen/?offset=1"),
            ],
        }
    }

    #[test]
    fn text_listing() {
        let (_dir, mut host) = host(OutputFormat::Text);
        host.render(listing()).unwrap();
        let out = String::from_utf8(host.into_inner()).unwrap();
        assert_eq!(
            out,
            "== Videos (videos)\n\
             > Clip\n    plugin://dzen/?action=play\n\
             + Next page\n    plugin://dzen/?offset=1\n"
        );
    }

    #[test]
    fn json_listing_parses_back() {
        let (_dir, mut host) = host(OutputFormat::Json);
        host.render(listing()).unwrap();
        let parsed: Listing = serde_json::from_slice(&host.into_inner()).unwrap();
        assert_eq!(parsed, listing());
    }

    #[test]
    fn resolve_without_player_prints_url() {
        let (_dir, mut host) = host(OutputFormat::Text);
        host.resolve(Playback::new("https://cdn/v.m3u8", Vec::new()))
            .unwrap();
        assert_eq!(host.into_inner(), b"https://cdn/v.m3u8\n");
    }

    #[test]
    fn navigation_is_taken_once() {
        let (_dir, mut host) = host(OutputFormat::Text);
        host.navigate("plugin://dzen/?context=search");
        assert_eq!(
            host.next_navigation().as_deref(),
            Some("plugin://dzen/?context=search")
        );
        assert!(host.next_navigation().is_none());
    }

    #[test]
    fn format_parsing() {
        assert_eq!(OutputFormat::from_str("JSON").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("m3u").is_err());
    }
}
