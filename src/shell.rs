// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

use crate::adapters::{self, HomeAdapter, SearchAdapter, VideosAdapter};
use crate::host::Host;
use crate::nav::NavParams;
use crate::page::PageEngine;
use crate::site::Site;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown context: {0}")]
    UnknownContext(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("context {context} does not support action {action}")]
    Unsupported {
        context: ContextKind,
        action: ActionKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    Home,
    Videos,
    Search,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Load,
    Search,
    History,
    Play,
    Favorites,
}

impl ContextKind {
    pub fn name(&self) -> &'static str {
        match self {
            ContextKind::Home => "home",
            ContextKind::Videos => "videos",
            ContextKind::Search => "search",
        }
    }
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Load => "load",
            ActionKind::Search => "search",
            ActionKind::History => "history",
            ActionKind::Play => "play",
            ActionKind::Favorites => "favorites",
        }
    }
}

impl fmt::Display for ContextKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ContextKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(ContextKind::Home),
            "videos" => Ok(ContextKind::Videos),
            "search" => Ok(ContextKind::Search),
            _ => Err(DispatchError::UnknownContext(s.to_string())),
        }
    }
}

impl FromStr for ActionKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "load" => Ok(ActionKind::Load),
            "search" => Ok(ActionKind::Search),
            "history" => Ok(ActionKind::History),
            "play" => Ok(ActionKind::Play),
            "favorites" => Ok(ActionKind::Favorites),
            _ => Err(DispatchError::UnknownAction(s.to_string())),
        }
    }
}

/// Validates the pair before anything runs.
pub fn resolve(params: &NavParams) -> Result<(ContextKind, ActionKind), DispatchError> {
    let context: ContextKind = params.context().parse()?;
    let action: ActionKind = params.action().parse()?;

    use ActionKind::*;
    let supported = match context {
        ContextKind::Home => matches!(action, Load | Favorites),
        ContextKind::Videos => matches!(action, Load | Play),
        ContextKind::Search => matches!(action, Load | Search | History | Play),
    };

    if supported {
        Ok((context, action))
    } else {
        Err(DispatchError::Unsupported { context, action })
    }
}

/// Runs one navigation request against `host`.
pub async fn dispatch(site: &Site, params: &NavParams, host: &mut dyn Host) -> Result<()> {
    let (context, action) = resolve(params)?;
    debug!("Context: {}", context);
    debug!("Action: {}", action);

    let engine = PageEngine::new(site, params);
    match (context, action) {
        (ContextKind::Home, ActionKind::Favorites) => HomeAdapter.favorites(host),
        (ContextKind::Home, _) => engine.load(&HomeAdapter, host).await,
        (ContextKind::Videos, ActionKind::Play) | (ContextKind::Search, ActionKind::Play) => {
            adapters::play(site, params, host)
        }
        (ContextKind::Videos, _) => engine.load(&VideosAdapter, host).await,
        (ContextKind::Search, ActionKind::Search) => SearchAdapter.search(site, params, host),
        (ContextKind::Search, ActionKind::History) => SearchAdapter.history(site, host),
        (ContextKind::Search, _) => engine.load(&SearchAdapter, host).await,
    }
}

/// Dispatches `url`, then whatever the host navigates to next.
pub async fn run(site: &Site, url: &str, host: &mut dyn Host) -> Result<()> {
    let mut next = Some(url.to_string());
    while let Some(url) = next {
        dispatch(site, &NavParams::parse(&url), host).await?;
        next = host.next_navigation();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve_url(url: &str) -> Result<(ContextKind, ActionKind), DispatchError> {
        resolve(&NavParams::parse(url))
    }

    #[test]
    fn defaults_to_home_load() {
        assert_eq!(
            resolve_url("plugin://dzen/"),
            Ok((ContextKind::Home, ActionKind::Load))
        );
    }

    #[test]
    fn known_pairs_resolve() {
        assert_eq!(
            resolve_url("?context=videos&action=play&spath=x"),
            Ok((ContextKind::Videos, ActionKind::Play))
        );
        assert_eq!(
            resolve_url("?context=search&action=history"),
            Ok((ContextKind::Search, ActionKind::History))
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert_eq!(
            resolve_url("?context=music"),
            Err(DispatchError::UnknownContext("music".to_string()))
        );
        assert_eq!(
            resolve_url("?context=videos&action=delete"),
            Err(DispatchError::UnknownAction("delete".to_string()))
        );
    }

    #[test]
    fn unsupported_pair_is_rejected() {
        let err = resolve_url("?context=home&action=play").unwrap_err();
        assert_eq!(
            err.to_string(),
            "context home does not support action play"
        );
    }
}
