//! TCP Client
//!
//! Owns a single connection to the server.

use std::io::{BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{ClientError, Result};
use crate::protocol::{encode_command, Command, Decoder, Reply};

/// A connected client
pub struct Client {
    /// TCP stream reader, kept across replies so buffered bytes are not lost
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reply decoder carrying the configured limits
    decoder: Decoder,

    /// Peer address for logging
    peer_addr: String,
}

impl Client {
    /// Connect to the server named by `config`
    ///
    /// Every resolved address is tried in order; the first to accept wins.
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let stream = if config.connect_timeout_ms > 0 {
            let timeout = Duration::from_millis(config.connect_timeout_ms);
            connect_timeout(&resolve(&addr)?, timeout)?
        } else {
            TcpStream::connect(resolve(&addr)?.as_slice())?
        };

        let client = Self::from_stream(stream, config)?;
        tracing::debug!("Connected to {}", client.peer_addr);
        Ok(client)
    }

    /// Wrap a stream that is already connected to the server
    ///
    /// Read and write timeouts from `config` are applied to the socket.
    pub fn from_stream(stream: TcpStream, config: &Config) -> Result<Self> {
        // Requests are small and each one waits for its reply
        stream.set_nodelay(true)?;
        apply_timeouts(&stream, config)?;

        let peer_addr = match stream.peer_addr() {
            Ok(addr) => addr.to_string(),
            Err(_) => config.addr(),
        };

        // Both halves share one socket, so timeouts set above cover them
        let writer = BufWriter::new(stream.try_clone()?);
        Ok(Self {
            reader: BufReader::new(stream),
            writer,
            decoder: Decoder::new(config.max_bulk_len),
            peer_addr,
        })
    }

    /// Send one command; returns the number of bytes written
    pub fn send(&mut self, command: &Command) -> Result<usize> {
        self.write_request(&command.encode())
    }

    /// Send a command given as a name and raw arguments
    pub fn send_raw<A: AsRef<[u8]>>(&mut self, name: &[u8], args: &[A]) -> Result<usize> {
        self.write_request(&encode_command(name, args))
    }

    /// Block until one complete reply has been read
    pub fn read_reply(&mut self) -> Result<Reply> {
        let reply = self.decoder.read_reply(&mut self.reader)?;
        tracing::trace!("Received reply from {}: {:?}", self.peer_addr, reply);
        Ok(reply)
    }

    /// Send a command and wait for its reply
    pub fn execute(&mut self, command: &Command) -> Result<Reply> {
        self.send(command)?;
        self.read_reply()
    }

    /// Close the connection
    pub fn close(mut self) -> Result<()> {
        self.writer.flush()?;
        match self.writer.get_ref().shutdown(Shutdown::Both) {
            Ok(()) => {}
            // Peer already went away
            Err(e) if e.kind() == std::io::ErrorKind::NotConnected => {}
            Err(e) => return Err(e.into()),
        }
        tracing::debug!("Connection to {} closed", self.peer_addr);
        Ok(())
    }

    fn write_request(&mut self, bytes: &[u8]) -> Result<usize> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        tracing::trace!("Sent {} bytes to {}", bytes.len(), self.peer_addr);
        Ok(bytes.len())
    }
}

/// A zero timeout leaves the socket blocking
fn apply_timeouts(stream: &TcpStream, config: &Config) -> Result<()> {
    if config.read_timeout_ms > 0 {
        stream.set_read_timeout(Some(Duration::from_millis(config.read_timeout_ms)))?;
    }
    if config.write_timeout_ms > 0 {
        stream.set_write_timeout(Some(Duration::from_millis(config.write_timeout_ms)))?;
    }
    Ok(())
}

fn resolve(addr: &str) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|e| ClientError::Config(format!("cannot resolve {}: {}", addr, e)))?
        .collect();

    if addrs.is_empty() {
        return Err(ClientError::Config(format!("{} resolved to no addresses", addr)));
    }
    Ok(addrs)
}

/// Try each resolved address in turn, returning the last failure
fn connect_timeout(addrs: &[SocketAddr], timeout: Duration) -> Result<TcpStream> {
    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(addr, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", addr, e);
                last_err = Some(e);
            }
        }
    }

    // resolve() never returns an empty list
    Err(last_err
        .map(ClientError::Io)
        .unwrap_or_else(|| ClientError::Config("no addresses to connect to".to_string())))
}
