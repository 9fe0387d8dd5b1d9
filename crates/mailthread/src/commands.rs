//! Subcommand handlers.

use crate::prompt;
use crate::style::summary_style;
use anyhow::{Context, Result, bail};
use mailthread_core::{
    Error, Grouping, Mail, MaildirStore, Message, SmtpConfig, Thread, Threader, compose_new,
    compose_reply, compose_reply_unthreaded, scan, send_message,
};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Where messages come from and how they are grouped.
pub struct Maildir {
    pub root: PathBuf,
    pub grouping: Grouping,
}

impl Maildir {
    /// Scans the maildir, reporting unreadable files on stderr.
    fn messages(&self) -> Result<Vec<Message>> {
        let report = scan(&self.root)
            .with_context(|| format!("Cannot read maildir {}", self.root.display()))?;

        for failure in &report.failures {
            eprintln!("skipped {}: {}", failure.path.display(), failure.error);
        }
        Ok(report.messages)
    }

    fn threads(&self) -> Result<Vec<Thread>> {
        Ok(Threader::new(self.grouping).thread_messages(self.messages()?))
    }

    fn thread(&self, number: usize) -> Result<Thread> {
        let mut threads = self.threads()?;
        if number == 0 || number > threads.len() {
            bail!("No thread {number} (there are {})", threads.len());
        }
        Ok(threads.swap_remove(number - 1))
    }
}

pub fn list(maildir: &Maildir, flat: bool, color: bool) -> Result<()> {
    let style = summary_style(color);
    let mut out = io::stdout().lock();

    if flat {
        for (i, message) in maildir.messages()?.iter().enumerate() {
            let marker = if message.is_seen() { ' ' } else { '*' };
            writeln!(out, "{:>4}{marker} {}", i + 1, message.summary_with(style))?;
        }
        return Ok(());
    }

    for (i, thread) in maildir.threads()?.iter().enumerate() {
        let unseen = thread.messages().iter().any(|m| !m.is_seen());
        let marker = if unseen { '*' } else { ' ' };
        let count = match thread.message_count() {
            1 => String::new(),
            n => format!(" ({n})"),
        };
        writeln!(out, "{:>4}{marker} {}{count}", i + 1, thread.summary_with(style))?;
    }
    Ok(())
}

pub fn show(maildir: &Maildir, number: usize, all: bool, keep_unseen: bool) -> Result<()> {
    let mut thread = maildir.thread(number)?;

    {
        let mut out = io::stdout().lock();
        if all {
            for (i, message) in thread.messages().iter().enumerate() {
                if i > 0 {
                    writeln!(out, "\n{}", "-".repeat(72))?;
                }
                write!(out, "{}", message.render_full())?;
            }
        } else {
            write!(out, "{}", thread.render_full())?;
        }
        out.flush()?;
    }

    if !keep_unseen {
        let mut store = MaildirStore::new(&maildir.root);
        for message in thread.messages_mut() {
            if let Err(e) = message.mark_seen(&mut store) {
                eprintln!(
                    "could not mark {} seen: {e}",
                    message.storage_name().unwrap_or("message")
                );
            }
        }
    }
    Ok(())
}

pub async fn reply(
    maildir: &Maildir,
    config: Option<&Path>,
    number: usize,
    from: &str,
    save: Option<&Path>,
) -> Result<()> {
    let thread = maildir.thread(number)?;
    let original = thread.latest();

    eprintln!("Replying to: {}", original.summary());
    eprintln!("Enter your reply, then SEND on its own line.");
    let body = prompt::read_body(&mut io::stdin().lock())?;

    let reply = match compose_reply(original, from, &body) {
        Ok(reply) => reply,
        Err(e @ Error::MissingIdentity { .. }) => {
            eprintln!("warning: {e}; sending without threading headers");
            compose_reply_unthreaded(original, from, &body)
        }
        Err(e) => return Err(e.into()),
    };

    dispatch(&reply, config, save).await
}

pub async fn send(config: Option<&Path>, save: Option<&Path>) -> Result<()> {
    let draft = {
        let mut input = io::stdin().lock();
        let mut output = io::stdout().lock();
        prompt::write_message(&mut input, &mut output)?
    };

    let message = compose_new(&draft.to, &draft.from, &draft.subject, &draft.body);
    dispatch(&message, config, save).await
}

pub fn headers() -> Result<()> {
    let message = Message::parse(io::stdin().lock()).context("Cannot parse message")?;
    let mut out = io::stdout().lock();
    write!(out, "{}", message.headers())?;
    Ok(())
}

/// Saves the message when a path is given, otherwise delivers it.
async fn dispatch(message: &Message, config: Option<&Path>, save: Option<&Path>) -> Result<()> {
    if let Some(path) = save {
        save_draft(message, path)?;
        eprintln!("Saved to {}", path.display());
        return Ok(());
    }

    let config_path = config.map_or_else(SmtpConfig::default_path, Path::to_path_buf);
    let config = SmtpConfig::load(&config_path)?;

    eprintln!("Sending...");
    send_message(&config, message).await?;
    eprintln!("Message sent");
    Ok(())
}

/// Writes the RFC 5322 rendering, readable only by the owner.
fn save_draft(message: &Message, path: &Path) -> Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options
        .open(path)
        .with_context(|| format!("Cannot create {}", path.display()))?;
    file.write_all(message.to_rfc5322().as_bytes())?;
    Ok(())
}
