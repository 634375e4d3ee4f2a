// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use super::{CommandContext, OutputFormat};
use anyhow::Result;

use dzen::nav::get_url;
use dzen::shell;

pub struct SearchCommand {
    pub query: String,
    pub format: OutputFormat,
    pub play: bool,
}

impl SearchCommand {
    pub async fn execute(self, context: CommandContext) -> Result<()> {
        let site = context.open_site().await?;
        let mut host = context.console_host(self.format, self.play);

        // Goes through the search action so the term lands in history
        let url = get_url(
            &site.base_url,
            &[
                ("action", "search"),
                ("context", "search"),
                ("search", self.query.as_str()),
                ("url", site.base_url.as_str()),
            ],
        );

        let result = shell::run(&site, &url, &mut host).await;
        site.save_session()?;
        result
    }
}
