//! Reply definitions
//!
//! The decoded shape of a server reply.

use std::fmt;

use super::format::format_reply;

/// One element of a multi-value reply: absent (null bulk) or raw bytes
pub type Element = Option<Vec<u8>>;

/// A decoded reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Status, error, integer or bulk reply; `None` for a null bulk
    Single(Option<Vec<u8>>),

    /// Array reply; `None` for a null array
    Multi(Option<Vec<Element>>),
}

impl Reply {
    /// True for a null bulk or a null array
    pub fn is_nil(&self) -> bool {
        matches!(self, Reply::Single(None) | Reply::Multi(None))
    }

    /// True if this reply came from an array
    pub fn is_multi(&self) -> bool {
        matches!(self, Reply::Multi(_))
    }

    /// Render as display lines
    pub fn format(&self) -> Vec<String> {
        format_reply(self)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format().join("\n"))
    }
}
