//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use mailthread_core::Grouping;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "mailthread", version, about = "Read a maildir as threads and send replies")]
pub struct Cli {
    /// Maildir to read.
    #[arg(long, global = true, env = "MAILTHREAD_MAILDIR")]
    pub maildir: Option<PathBuf>,

    /// SMTP configuration file (`.json`, or legacy `.cfg`).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// How messages are grouped into threads.
    #[arg(long, global = true, value_enum, default_value_t = GroupBy::Subject)]
    pub group_by: GroupBy,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List threads (or messages) with numbered summaries.
    List {
        /// List every message instead of threads.
        #[arg(long)]
        flat: bool,

        /// Print summaries without terminal colors.
        #[arg(long)]
        no_color: bool,
    },

    /// Show a thread and mark its messages seen.
    Show {
        /// Thread number from `list`.
        number: usize,

        /// Show every message in the thread, not just the first.
        #[arg(long)]
        all: bool,

        /// Leave the seen flags untouched.
        #[arg(long)]
        keep_unseen: bool,
    },

    /// Reply to the latest message of a thread.
    ///
    /// The reply text is read from stdin up to a line reading `SEND`.
    Reply {
        /// Thread number from `list`.
        number: usize,

        /// Your address.
        #[arg(long)]
        from: String,

        /// Write the reply to this file instead of sending it.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Write a new message interactively and send it.
    Send {
        /// Write the message to this file instead of sending it.
        #[arg(long)]
        save: Option<PathBuf>,
    },

    /// Print the headers of a message read from stdin.
    Headers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GroupBy {
    /// Normalized subject, so replies join their original.
    Subject,
    /// Subject and sender, exactly as summarized.
    Summary,
}

impl From<GroupBy> for Grouping {
    fn from(group_by: GroupBy) -> Self {
        match group_by {
            GroupBy::Subject => Self::Subject,
            GroupBy::Summary => Self::Summary,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_reply() {
        let cli = Cli::try_parse_from([
            "mailthread",
            "--maildir",
            "/tmp/mail",
            "reply",
            "3",
            "--from",
            "me@example.com",
        ])
        .unwrap();

        assert_eq!(cli.maildir, Some(PathBuf::from("/tmp/mail")));
        assert_eq!(cli.group_by, GroupBy::Subject);
        assert!(matches!(
            cli.command,
            Command::Reply { number: 3, ref from, save: None } if from == "me@example.com"
        ));
    }

    #[test]
    fn test_parse_list_options() {
        let cli =
            Cli::try_parse_from(["mailthread", "list", "--flat", "--group-by", "summary"]).unwrap();
        assert_eq!(Grouping::from(cli.group_by), Grouping::Summary);
        assert!(matches!(
            cli.command,
            Command::List {
                flat: true,
                no_color: false
            }
        ));
    }
}
