// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::{Context, Result};
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::host::Playback;

#[derive(Debug, Clone)]
pub struct Player {
    config: PlayerConfig,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Self {
        Self { config }
    }

    fn is_mpv(&self) -> bool {
        self.config
            .command
            .rsplit(['/', '\\'])
            .next()
            .is_some_and(|name| name.to_lowercase().starts_with("mpv"))
    }

    /// Arguments for `playback`, URL last
    pub fn args_for(&self, playback: &Playback) -> Vec<String> {
        let mut args = self.config.args.clone();

        if playback.hls {
            args.extend(self.config.hls_args.iter().cloned());
        }

        if self.is_mpv() {
            for (name, value) in &playback.headers {
                if name.eq_ignore_ascii_case("user-agent") {
                    args.push(format!("--user-agent={}", value));
                } else {
                    args.push(format!("--http-header-fields-append={}: {}", name, value));
                }
            }
        }

        args.push(playback.url.clone());
        args
    }

    fn command_for(&self, playback: &Playback) -> Command {
        let mut cmd = Command::new(&self.config.command);
        cmd.args(self.args_for(playback));
        cmd
    }

    /// Runs the player in the foreground until it exits.
    pub fn play(&self, playback: &Playback) -> Result<()> {
        info!("Play url: {}", playback.url);
        let status = self.command_for(playback).status().with_context(|| {
            format!("Failed to execute player command: {}", self.config.command)
        })?;

        if !status.success() {
            // mpv exits with 4 when the user quits
            if self.is_mpv() && status.code() == Some(4) {
                return Ok(());
            }
            return Err(anyhow::anyhow!(
                "Player process failed with exit code: {}",
                status
            ));
        }

        debug!("Player exited successfully");
        Ok(())
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.config.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }
}
