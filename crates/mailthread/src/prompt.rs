//! Line-based prompts for writing messages.

use std::io::{self, BufRead, Write};

/// Line that ends message text.
const END_OF_TEXT: &str = "SEND";

/// Fields collected by [`write_message`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub to: String,
    pub from: String,
    pub subject: String,
    pub body: String,
}

/// Prints `label` and reads one line of input.
pub fn ask<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> io::Result<String> {
    write!(output, "{label}: ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Reads text up to a line reading `SEND` (or end of input).
///
/// Every kept line ends with `\n`.
pub fn read_body<R: BufRead>(input: &mut R) -> io::Result<String> {
    let mut body = String::new();
    let mut line = String::new();

    loop {
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim_end_matches(['\r', '\n']);
        if text == END_OF_TEXT {
            break;
        }
        body.push_str(text);
        body.push('\n');
    }

    Ok(body)
}

/// Prompts for recipient, sender, subject and text.
pub fn write_message<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> io::Result<Draft> {
    let to = ask(input, output, "To")?;
    let from = ask(input, output, "From")?;
    let subject = ask(input, output, "Subject")?;
    writeln!(output, "Content: (Enter {END_OF_TEXT} on its own line to finish)")?;
    output.flush()?;
    let body = read_body(input)?;

    Ok(Draft {
        to,
        from,
        subject,
        body,
    })
}
