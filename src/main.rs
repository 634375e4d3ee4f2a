// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use anyhow::Result;
use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use dzen::host::TerminalHost;
use dzen::{Config, Paths, Site};

mod cli;
use cli::{CacheCommand, CommandContext, OpenCommand, OutputFormat, SearchCommand, SessionCommand};

fn cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Green.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Cyan.on_default())
}

#[derive(Parser)]
#[command(name = "dzen")]
#[command(about = "A terminal browser for the Dzen video feed")]
#[command(version)]
#[command(styles = cargo_style())]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug logging to file (dzen_debug.log)
    #[arg(long, global = true)]
    debug_log: bool,

    /// Directory for cookies, cached pages and history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse interactively (default if no command given)
    Browse,

    /// Dispatch a plugin:// navigation URL and print the result
    Open {
        /// Navigation URL (defaults to the home menu)
        url: Option<String>,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Start the player for resolved videos instead of printing them
        #[arg(short, long)]
        play: bool,
    },

    /// Search videos
    Search {
        /// Search query
        query: String,
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
        /// Start the player for resolved videos instead of printing them
        #[arg(short, long)]
        play: bool,
    },

    /// Manage cached pages
    #[command(subcommand)]
    Cache(CacheSubCommand),

    /// Inspect or reset the stored session
    #[command(subcommand)]
    Session(SessionSubCommand),
}

#[derive(Subcommand)]
enum CacheSubCommand {
    /// List cached pages
    List,
    /// Clear cache
    Clear,
}

#[derive(Subcommand)]
enum SessionSubCommand {
    /// Show stored cookies and login
    Show,
    /// Forget stored cookies
    Reset,
}

async fn run_browser(config: Config, paths: Paths) -> Result<()> {
    let context = CommandContext::new(config, paths);
    let site = Site::open(context.config.clone(), context.paths.clone()).await?;

    let mut host = TerminalHost::new(
        context.player(),
        context.favourites(),
        context.config.ui.page_size,
    );
    let result = host.browse(&site).await;
    site.save_session()?;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    if cli.debug_log {
        let file = File::create("dzen_debug.log")?;
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_level(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(
                EnvFilter::from_default_env()
                    .add_directive("dzen=debug".parse()?)
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive(tracing::Level::DEBUG.into())
                    .add_directive("hyper_util=error".parse()?),
            )
            .init();
    } else if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("hyper_util=error".parse()?),
            )
            .init();
    }

    let config = Config::load_or_default(Config::default_path());
    let paths = Paths::resolve(cli.data_dir)?;

    match cli.command {
        Some(Commands::Browse) | None => run_browser(config, paths).await?,

        Some(Commands::Open { url, format, play }) => {
            let cmd = OpenCommand {
                url,
                format: OutputFormat::from_str(&format)?,
                play,
            };
            cmd.execute(CommandContext::new(config, paths)).await?;
        }

        Some(Commands::Search {
            query,
            format,
            play,
        }) => {
            let cmd = SearchCommand {
                query,
                format: OutputFormat::from_str(&format)?,
                play,
            };
            cmd.execute(CommandContext::new(config, paths)).await?;
        }

        Some(Commands::Cache(cache_cmd)) => {
            let cmd = match cache_cmd {
                CacheSubCommand::List => CacheCommand::List,
                CacheSubCommand::Clear => CacheCommand::Clear,
            };
            cmd.execute(CommandContext::new(config, paths))?;
        }

        Some(Commands::Session(session_cmd)) => {
            let cmd = match session_cmd {
                SessionSubCommand::Show => SessionCommand::Show,
                SessionSubCommand::Reset => SessionCommand::Reset,
            };
            cmd.execute(CommandContext::new(config, paths))?;
        }
    }

    Ok(())
}
