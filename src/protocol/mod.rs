//! Protocol Module
//!
//! RESP wire protocol as spoken by the client side.
//!
//! ### Request Format
//! ```text
//! *<N>\r\n
//! $<len>\r\n<bytes>\r\n      (N times; element 0 is the command name)
//! ```
//!
//! ### Reply Format
//! - `+<line>\r\n`  status
//! - `-<line>\r\n`  error
//! - `:<line>\r\n`  integer
//! - `$<len>\r\n<bytes>\r\n`, or `$-1\r\n` for null
//! - `*<N>\r\n` followed by N of the above, `*0\r\n` empty, `*-1\r\n` null
//!
//! Status, error and integer replies all decode to the same raw bytes.

mod command;
mod reply;
mod codec;
mod format;

pub use command::Command;
pub use reply::{Element, Reply};
pub use codec::{
    decode_reply, encode_command, read_multi, read_reply, read_single, Decoder, MAX_BULK_LEN,
};
pub use format::{format_reply, EMPTY_LIST, NIL};
