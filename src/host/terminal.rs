// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use inquire::{Select, Text};
use std::fmt;
use tracing::{debug, warn};

use super::{Host, Playback};
use crate::favourites::{Favourite, FavouritesManager};
use crate::nav::NavParams;
use crate::page::{Listing, MenuItem};
use crate::player::Player;
use crate::shell;
use crate::site::Site;

const ADD_FAVOURITE: &str = "⭐ Add to favourites";
const REMOVE_FAVOURITE: &str = "🗑 Remove a favourite";
const CANCEL: &str = "Cancel";

enum Choice {
    Item(usize, String),
    Options,
    Back,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Item(_, label) => write!(f, "{}", label),
            Choice::Options => write!(f, "⚙ Options"),
            Choice::Back => write!(f, "← Back"),
            Choice::Quit => write!(f, "Quit"),
        }
    }
}

fn display_label(item: &MenuItem) -> String {
    if item.is_playable {
        format!("▶ {}", item.label)
    } else if item.is_folder {
        format!("📁 {}", item.label)
    } else {
        item.label.clone()
    }
}

/// Interactive browser: every listing becomes a select prompt.
pub struct TerminalHost {
    player: Player,
    favourites: FavouritesManager,
    page_size: usize,
    /// Listings shown so far, for going back
    stack: Vec<String>,
    current: String,
    pending: Option<String>,
    quit: bool,
}

impl TerminalHost {
    pub fn new(player: Player, favourites: FavouritesManager, page_size: usize) -> Self {
        Self {
            player,
            favourites,
            page_size,
            stack: Vec::new(),
            current: String::new(),
            pending: None,
            quit: false,
        }
    }

    pub async fn browse(&mut self, site: &Site) -> Result<()> {
        println!("Welcome to dzen!");

        if !self.player.is_available() {
            println!("Warning: Media player not found. Videos may not play correctly.");
        }

        let mut next = Some(site.base_url.clone());
        while let Some(url) = next {
            self.current = url.clone();
            let params = NavParams::parse(&url);
            if let Err(e) = shell::dispatch(site, &params, self).await {
                println!("❌ Error: {:#}", e);
                if self.stack.is_empty() {
                    return Err(e);
                }
            }
            next = self.next_navigation();
        }

        println!("Goodbye!");
        Ok(())
    }

    fn go_back(&mut self) {
        self.stack.pop();
        match self.stack.last() {
            Some(url) => self.pending = Some(url.clone()),
            None => self.quit = true,
        }
    }

    fn remember_current(&mut self) {
        let url = self.current.trim_end_matches("&refresh=true").to_string();
        if self.stack.last() != Some(&url) {
            self.stack.push(url);
        }
    }

    fn show_options(&mut self, listing: &Listing) -> Result<()> {
        let mut options: Vec<String> = Vec::new();
        let mut targets: Vec<String> = Vec::new();
        for entry in listing.items.iter().flat_map(|i| &i.context_menu) {
            if !options.contains(&entry.label) {
                options.push(entry.label.clone());
                targets.push(entry.url.clone());
            }
        }
        let shared = options.len();
        options.push(ADD_FAVOURITE.to_string());
        options.push(CANCEL.to_string());

        let Some(selected) = Select::new("Options:", options.clone()).prompt_skippable()? else {
            return Ok(());
        };

        if let Some(idx) = options[..shared].iter().position(|o| *o == selected) {
            self.pending = Some(targets[idx].clone());
        } else if selected == ADD_FAVOURITE {
            self.pick_favourite(listing)?;
        }
        Ok(())
    }

    fn pick_favourite(&mut self, listing: &Listing) -> Result<()> {
        let labels: Vec<String> = listing.items.iter().map(display_label).collect();
        let Some(selected) = Select::new("Add which item?", labels.clone())
            .with_page_size(self.page_size)
            .prompt_skippable()?
        else {
            return Ok(());
        };

        if let Some(item) = labels
            .iter()
            .position(|l| *l == selected)
            .map(|idx| &listing.items[idx])
        {
            if self.favourites.add_favourite(Favourite::from_item(item))? {
                println!("⭐ Added {}", item.label);
            } else {
                println!("{} is already a favourite", item.label);
            }
        }
        Ok(())
    }
}

impl Host for TerminalHost {
    fn render(&mut self, listing: Listing) -> Result<()> {
        self.remember_current();

        let mut choices: Vec<Choice> = listing
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| Choice::Item(idx, display_label(item)))
            .collect();
        choices.push(Choice::Options);
        if self.stack.len() > 1 {
            choices.push(Choice::Back);
        }
        choices.push(Choice::Quit);

        let selection = Select::new(&listing.title, choices)
            .with_page_size(self.page_size)
            .prompt_skippable()?;

        match selection {
            Some(Choice::Item(idx, _)) => {
                let item = &listing.items[idx];
                debug!("Selected {} -> {}", item.id, item.url);
                self.pending = Some(item.url.clone());
            }
            Some(Choice::Options) => self.show_options(&listing)?,
            Some(Choice::Back) | None => self.go_back(),
            Some(Choice::Quit) => self.quit = true,
        }
        Ok(())
    }

    fn input(&mut self, heading: &str) -> Result<Option<String>> {
        Ok(Text::new(heading).prompt_skippable()?)
    }

    fn resolve(&mut self, playback: Playback) -> Result<()> {
        println!("Starting playback... (quit the player to return to the menu)");
        if let Err(e) = self.player.play(&playback) {
            warn!("Playback failed: {:#}", e);
            println!("❌ Playback failed: {:#}", e);
        }
        Ok(())
    }

    fn navigate(&mut self, url: &str) {
        self.pending = Some(url.to_string());
    }

    fn open_favourites(&mut self) -> Result<()> {
        let favourites = self.favourites.get_favourites()?;
        if favourites.is_empty() {
            println!("No favourites yet. Use ⚙ Options on any listing to add some.");
            return Ok(());
        }

        let mut labels: Vec<String> = favourites.iter().map(|f| f.label.clone()).collect();
        labels.push(REMOVE_FAVOURITE.to_string());

        let Some(selected) = Select::new("Favourites", labels.clone())
            .with_page_size(self.page_size)
            .prompt_skippable()?
        else {
            return Ok(());
        };

        if selected == REMOVE_FAVOURITE {
            let names: Vec<String> = favourites.iter().map(|f| f.label.clone()).collect();
            if let Some(name) = Select::new("Remove which favourite?", names).prompt_skippable()?
                && let Some(favourite) = favourites.iter().find(|f| f.label == name)
            {
                self.favourites.remove_favourite(&favourite.url)?;
                println!("Removed {}", favourite.label);
            }
        } else if let Some(favourite) = favourites.iter().find(|f| f.label == selected) {
            self.pending = Some(favourite.url.clone());
        }
        Ok(())
    }

    fn next_navigation(&mut self) -> Option<String> {
        if self.quit {
            return None;
        }
        self.pending.take().or_else(|| self.stack.last().cloned())
    }
}
