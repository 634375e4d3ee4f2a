// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::{CommandContext, OutputFormat};
use anyhow::Result;

use dzen::shell;

/// Dispatches one navigation URL and prints what it produces.
pub struct OpenCommand {
    pub url: Option<String>,
    pub format: OutputFormat,
    pub play: bool,
}

impl OpenCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let site = context.open_site().await?;
        let mut host = context.console_host(self.format, self.play);

        let url = self.url.unwrap_or_else(|| site.base_url.clone());
        let result = shell::run(&site, &url, &mut host).await;
        site.save_session()?;
        result
    }
}
