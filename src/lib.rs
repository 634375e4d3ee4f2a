// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

pub mod adapters;
pub mod cache;
pub mod config;
pub mod favourites;
pub mod history;
pub mod host;
pub mod nav;
pub mod page;
pub mod player;
pub mod session;
pub mod shell;
pub mod site;
pub mod users;

pub use cache::CacheStore;
pub use config::{Config, Paths};
pub use host::Host;
pub use page::{Adapter, Listing, MenuItem, PageEngine, PageResult};
pub use player::Player;
pub use session::Session;
pub use site::Site;
