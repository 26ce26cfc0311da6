//! Reply formatting
//!
//! Renders a decoded reply the way redis-cli prints it. Single values are
//! printed bare; array elements are indexed and quoted.

use std::borrow::Cow;

use super::Reply;

/// Line printed for a null bulk or a null array
pub const NIL: &str = "(nil)";

/// Line printed for an empty array
pub const EMPTY_LIST: &str = "(empty list or set)";

/// Turn a reply into display lines; never returns an empty vector
pub fn format_reply(reply: &Reply) -> Vec<String> {
    match reply {
        Reply::Single(None) | Reply::Multi(None) => vec![NIL.to_string()],
        Reply::Single(Some(value)) => vec![render(value).into_owned()],
        Reply::Multi(Some(elements)) if elements.is_empty() => vec![EMPTY_LIST.to_string()],
        Reply::Multi(Some(elements)) => elements
            .iter()
            .enumerate()
            .map(|(i, element)| match element {
                None => format!("{}) {}", i, NIL),
                Some(value) => format!("{}) \"{}\"", i, render(value)),
            })
            .collect(),
    }
}

/// Invalid UTF-8 is replaced rather than rejected
fn render(bytes: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(bytes)
}
