//! Session Module
//!
//! Turns operator input lines into requests and prints the replies.
//! Input is handled as raw bytes so arguments stay binary safe.

use std::io::{BufRead, Write};

use crate::error::Result;
use crate::network::Client;
use crate::protocol::Command;

/// What happened to one line of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// Nothing but whitespace; nothing was sent
    Blank,

    /// The operator asked to leave; nothing was sent
    Quit,

    /// A request was sent and its reply printed
    Replied,
}

/// Execute one input line, writing each formatted reply line to `out`
///
/// A bare `quit` or `exit` (any case) ends the session locally. With
/// arguments they are sent to the server like any other command.
pub fn execute_line<W: Write>(
    client: &mut Client,
    line: &[u8],
    out: &mut W,
) -> Result<LineOutcome> {
    let command = match Command::from_line(line) {
        Some(command) => command,
        None => return Ok(LineOutcome::Blank),
    };

    if is_quit(&command) {
        return Ok(LineOutcome::Quit);
    }

    let reply = client.execute(&command)?;
    for formatted in reply.format() {
        writeln!(out, "{}", formatted)?;
    }
    out.flush()?;

    Ok(LineOutcome::Replied)
}

/// Execute lines from `input` until EOF or `quit`
pub fn run_script<R: BufRead, W: Write>(
    client: &mut Client,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let mut line = Vec::new();

    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }

        if execute_line(client, &line, out)? == LineOutcome::Quit {
            return Ok(());
        }
    }
}

fn is_quit(command: &Command) -> bool {
    command.args().is_empty()
        && (command.name().eq_ignore_ascii_case(b"quit")
            || command.name().eq_ignore_ascii_case(b"exit"))
}
