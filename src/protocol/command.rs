//! Command definitions
//!
//! A request to send to the server.

use bytes::Bytes;

use super::codec::encode_command;

/// A command name plus its ordered arguments
///
/// Names and arguments are raw bytes; nothing is validated or case-folded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: Vec<u8>,
    args: Vec<Vec<u8>>,
}

impl Command {
    /// Create a command with no arguments
    pub fn new(name: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument
    pub fn arg(mut self, arg: impl Into<Vec<u8>>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Create a command from a name and an argument list
    pub fn with_args<I, A>(name: impl Into<Vec<u8>>, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Vec<u8>>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Split an operator input line on ASCII whitespace
    ///
    /// The line is raw bytes and need not be valid UTF-8. Returns `None`
    /// for a blank line.
    pub fn from_line(line: &[u8]) -> Option<Self> {
        let mut parts = line
            .split(|b| b.is_ascii_whitespace())
            .filter(|part| !part.is_empty());
        let name = parts.next()?;
        Some(Self::with_args(name, parts))
    }

    /// The command name
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// The arguments, in order
    pub fn args(&self) -> &[Vec<u8>] {
        &self.args
    }

    /// Encode to wire bytes
    pub fn encode(&self) -> Bytes {
        encode_command(&self.name, &self.args)
    }
}
