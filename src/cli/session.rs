// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::CommandContext;
use anyhow::{Context, Result};
use std::fs;

use dzen::Site;
use dzen::session::{LOGIN_COOKIE, SESSION_COOKIE};
use dzen::users::UserRegistry;

pub enum SessionCommand {
    Show,
    Reset,
}

impl SessionCommand {
    pub fn execute(self, context: CommandContext) -> Result<()> {
        let cookies_file = context.paths.cookies_file();

        match self {
            Self::Show => {
                let site = Site::new(context.config.clone(), context.paths.clone())?;
                let jar = site.session.jar();

                println!("Cookie file: {}", cookies_file.display());
                println!("Stored cookies: {}", jar.len());
                println!(
                    "Session cookie: {}",
                    if jar.contains(SESSION_COOKIE) {
                        "present"
                    } else {
                        "missing"
                    }
                );

                match jar.get(LOGIN_COOKIE) {
                    Some(login) => {
                        let registry = UserRegistry::load(context.paths.users_file());
                        let known = if registry.find(&login).is_some() {
                            "known"
                        } else {
                            "not in users.json"
                        };
                        println!("Login: {} ({})", login, known);
                    }
                    None => println!("Login: <anonymous>"),
                }
            }
            Self::Reset => {
                if cookies_file.exists() {
                    fs::remove_file(&cookies_file).with_context(|| {
                        format!("Failed to remove cookie file: {}", cookies_file.display())
                    })?;
                    println!("Session reset");
                } else {
                    println!("No stored session");
                }
            }
        }

        Ok(())
    }
}
