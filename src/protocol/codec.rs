//! Protocol codec
//!
//! Encoding of requests and decoding of replies.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! *3\r\n
//! $3\r\nSET\r\n
//! $3\r\nkey\r\n
//! $5\r\nvalue\r\n
//! ```
//!
//! ### Reply Dispatch
//! ```text
//! peek ──┬── '*' ──► read_multi ──► N × element (single, never '*')
//!        └── else ─► read_single ─┬── '+' '-' ':' ──► rest of line
//!                                 └── '$' ──► len, payload, CRLF
//! ```

use std::io::{self, BufRead, Read};

use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{ClientError, Result};
use super::{Element, Reply};

/// Line terminator
const CRLF: &[u8] = b"\r\n";

const ARRAY: u8 = b'*';
const BULK: u8 = b'$';
const STATUS: u8 = b'+';
const ERROR: u8 = b'-';
const INTEGER: u8 = b':';

/// Length value that marks a null bulk or a null array
const NULL_LEN: i64 = -1;

/// Default upper bound on a single bulk payload (512 MB)
pub const MAX_BULK_LEN: usize = 512 * 1024 * 1024;

/// Upper bound on up-front allocation for an array's element vector
const MAX_PREALLOC: usize = 1024;

/// Upper bound on up-front allocation for a bulk payload (64 KB)
const MAX_PREALLOC_BYTES: usize = 64 * 1024;

/// Longest length or count line accepted; `i64::MIN` is 20 characters
const MAX_LENGTH_LINE: usize = 32;

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command as an array of bulk strings
///
/// Element 0 is the command name, followed by each argument in order.
/// Lengths are byte lengths, so payloads are binary safe.
pub fn encode_command<A: AsRef<[u8]>>(name: &[u8], args: &[A]) -> Bytes {
    let payload_len = name.len() + args.iter().map(|a| a.as_ref().len()).sum::<usize>();

    // Each element carries `$`, up to 20 length digits and two CRLFs
    let mut buf = BytesMut::with_capacity(payload_len + 25 * (args.len() + 2));

    write_header(&mut buf, ARRAY, args.len() + 1);
    write_bulk(&mut buf, name);
    for arg in args {
        write_bulk(&mut buf, arg.as_ref());
    }

    buf.freeze()
}

fn write_header(buf: &mut BytesMut, marker: u8, len: usize) {
    buf.put_u8(marker);
    buf.put_slice(len.to_string().as_bytes());
    buf.put_slice(CRLF);
}

fn write_bulk(buf: &mut BytesMut, payload: &[u8]) {
    write_header(buf, BULK, payload.len());
    buf.put_slice(payload);
    buf.put_slice(CRLF);
}

// =============================================================================
// Reply Decoding
// =============================================================================

/// Reply decoder
///
/// Stateless apart from its limits; every call consumes exactly one reply
/// from the reader and leaves it positioned right after that reply. After
/// an error the reader's position is unspecified.
#[derive(Debug, Clone, Copy)]
pub struct Decoder {
    max_bulk_len: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self {
            max_bulk_len: MAX_BULK_LEN,
        }
    }
}

impl Decoder {
    /// Create a decoder that rejects bulk payloads, and status, error or
    /// integer lines, longer than `max_bulk_len`
    pub fn new(max_bulk_len: usize) -> Self {
        Self { max_bulk_len }
    }

    /// Decode one reply of either shape
    pub fn read_reply<R: BufRead>(&self, reader: &mut R) -> Result<Reply> {
        if peek_byte(reader)? == ARRAY {
            Ok(Reply::Multi(self.read_multi(reader)?))
        } else {
            Ok(Reply::Single(self.read_single(reader)?))
        }
    }

    /// Decode an array reply
    ///
    /// `None` is the null array, `Some(vec![])` the empty one.
    pub fn read_multi<R: BufRead>(&self, reader: &mut R) -> Result<Option<Vec<Element>>> {
        let marker = read_byte(reader)?;
        if marker != ARRAY {
            return Err(ClientError::ProtocolFormat(format!(
                "expected array marker '*', found 0x{:02x}",
                marker
            )));
        }

        let count = match read_length(reader)? {
            NULL_LEN => return Ok(None),
            n if n < 0 => return Err(ClientError::LengthParse(n.to_string())),
            n => n as usize,
        };

        let mut elements = Vec::with_capacity(count.min(MAX_PREALLOC));
        for _ in 0..count {
            elements.push(self.read_element(reader)?);
        }

        Ok(Some(elements))
    }

    /// Decode a status, error, integer or bulk reply
    ///
    /// The marker is dropped: `+OK`, `-ERR x` and `:1` all come back as the
    /// text after the marker.
    pub fn read_single<R: BufRead>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
        match read_byte(reader)? {
            STATUS | ERROR | INTEGER => Ok(Some(read_line(reader, self.max_bulk_len)?)),
            BULK => self.read_bulk(reader),
            other => Err(ClientError::UnrecognizedMarker(other)),
        }
    }

    /// Array elements are scalars only
    fn read_element<R: BufRead>(&self, reader: &mut R) -> Result<Element> {
        if peek_byte(reader)? == ARRAY {
            return Err(ClientError::ProtocolFormat(
                "nested arrays are not supported as reply elements".to_string(),
            ));
        }
        self.read_single(reader)
    }

    /// Body of a bulk string, marker already consumed
    fn read_bulk<R: BufRead>(&self, reader: &mut R) -> Result<Option<Vec<u8>>> {
        let len = match read_length(reader)? {
            NULL_LEN => return Ok(None),
            n if n < 0 => return Err(ClientError::LengthParse(n.to_string())),
            n => n as u64,
        };

        if len > self.max_bulk_len as u64 {
            return Err(ClientError::ProtocolFormat(format!(
                "bulk length {} exceeds limit of {} bytes",
                len, self.max_bulk_len
            )));
        }

        // Grow with the bytes that actually arrive, not the declared length
        let mut payload = Vec::with_capacity((len as usize).min(MAX_PREALLOC_BYTES));
        reader.by_ref().take(len).read_to_end(&mut payload)?;
        if (payload.len() as u64) < len {
            return Err(ClientError::Truncated(format!(
                "stream ended after {} of {} bulk bytes",
                payload.len(),
                len
            )));
        }

        let mut terminator = [0u8; 2];
        read_exact(reader, &mut terminator)?;
        if terminator[..] != *CRLF {
            return Err(ClientError::ProtocolFormat(format!(
                "bulk payload of {} bytes not followed by CRLF",
                len
            )));
        }

        Ok(Some(payload))
    }
}

/// Decode one reply with the default limits
pub fn read_reply<R: BufRead>(reader: &mut R) -> Result<Reply> {
    Decoder::default().read_reply(reader)
}

/// Decode one array reply with the default limits
pub fn read_multi<R: BufRead>(reader: &mut R) -> Result<Option<Vec<Element>>> {
    Decoder::default().read_multi(reader)
}

/// Decode one non-array reply with the default limits
pub fn read_single<R: BufRead>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    Decoder::default().read_single(reader)
}

/// Decode the first reply in `bytes`; trailing bytes are ignored
pub fn decode_reply(bytes: &[u8]) -> Result<Reply> {
    let mut cursor = bytes;
    read_reply(&mut cursor)
}

// =============================================================================
// Stream helpers
// =============================================================================

/// Look at the next byte without consuming it
fn peek_byte<R: BufRead>(reader: &mut R) -> Result<u8> {
    let buf = reader.fill_buf()?;
    buf.first()
        .copied()
        .ok_or_else(|| ClientError::Truncated("stream ended before reply marker".to_string()))
}

fn read_byte<R: BufRead>(reader: &mut R) -> Result<u8> {
    let byte = peek_byte(reader)?;
    reader.consume(1);
    Ok(byte)
}

/// Read up to and including `\n`, returning the line without its terminator
///
/// A bare `\n` is accepted as a terminator as well as `\r\n`. Lines whose
/// content exceeds `limit` bytes are rejected without buffering the rest.
fn read_line<R: BufRead>(reader: &mut R, limit: usize) -> Result<Vec<u8>> {
    let cap = (limit as u64).saturating_add(2);
    let mut line = Vec::new();
    reader.by_ref().take(cap).read_until(b'\n', &mut line)?;

    if line.last() != Some(&b'\n') {
        if line.len() as u64 >= cap {
            return Err(ClientError::ProtocolFormat(format!(
                "line exceeds limit of {} bytes",
                limit
            )));
        }
        return Err(ClientError::Truncated(format!(
            "stream ended after {} bytes of an unterminated line",
            line.len()
        )));
    }
    line.pop();
    if line.last() == Some(&b'\r') {
        line.pop();
    }

    Ok(line)
}

/// Read a line holding a signed decimal length or count
fn read_length<R: BufRead>(reader: &mut R) -> Result<i64> {
    let line = read_line(reader, MAX_LENGTH_LINE)?;
    std::str::from_utf8(&line)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ClientError::LengthParse(String::from_utf8_lossy(&line).into_owned()))
}

fn read_exact<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let wanted = buf.len();
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ClientError::Truncated(format!("stream ended before {} expected bytes", wanted))
        }
        _ => ClientError::Io(e),
    })
}
