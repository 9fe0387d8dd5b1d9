//! Terminal colors for summaries.

use crossterm::style::{Color, Stylize, style};
use mailthread_core::{PlainStyle, SummaryStyle};

/// Colors the subject red and the sender yellow.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalStyle;

impl SummaryStyle for TerminalStyle {
    fn subject(&self, subject: &str) -> String {
        style(subject).with(Color::DarkRed).to_string()
    }

    fn sender(&self, sender: &str) -> String {
        style(sender).with(Color::DarkYellow).to_string()
    }
}

/// Picks the summary style for the output.
pub fn summary_style(color: bool) -> &'static dyn SummaryStyle {
    if color { &TerminalStyle } else { &PlainStyle }
}
