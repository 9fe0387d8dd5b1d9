//! `mailthread` - read a maildir as conversations and reply over SMTP.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;
mod prompt;
mod style;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use commands::Maildir;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailthread=info,mailthread_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let maildir = Maildir {
        root: cli.maildir.unwrap_or_else(default_maildir),
        grouping: cli.group_by.into(),
    };
    let config = cli.config.as_deref();
    tracing::debug!(maildir = %maildir.root.display(), grouping = ?maildir.grouping, "starting");

    match cli.command {
        Command::List { flat, no_color } => commands::list(&maildir, flat, !no_color),
        Command::Show {
            number,
            all,
            keep_unseen,
        } => commands::show(&maildir, number, all, keep_unseen),
        Command::Reply { number, from, save } => {
            commands::reply(&maildir, config, number, &from, save.as_deref()).await
        }
        Command::Send { save } => commands::send(config, save.as_deref()).await,
        Command::Headers => commands::headers(),
    }
}

fn default_maildir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Maildir")
}
