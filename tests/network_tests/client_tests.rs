//! Tests for Client
//!
//! These tests verify:
//! - Requests reach the server in wire format
//! - Replies are decoded from the live socket
//! - Buffered bytes survive between replies
//! - Protocol errors surface to the caller
//! - Operator input lines drive the session

use std::io::{Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use respcli::session::{execute_line, run_script};
use respcli::{Client, ClientError, Command, Config, LineOutcome, Reply};

// =============================================================================
// Helper Functions
// =============================================================================

/// Serve one connection: for each (request, reply) pair, read exactly the
/// request bytes, check them, then write the reply.
fn spawn_server(exchanges: Vec<(Vec<u8>, Vec<u8>)>) -> (Config, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        for (request, reply) in exchanges {
            let mut received = vec![0u8; request.len()];
            stream.read_exact(&mut received).unwrap();
            assert_eq!(received, request);
            stream.write_all(&reply).unwrap();
        }
    });

    let config = Config::builder()
        .host("127.0.0.1")
        .port(port)
        .read_timeout_ms(5000)
        .write_timeout_ms(5000)
        .build();
    (config, handle)
}

// =============================================================================
// Request/Reply Tests
// =============================================================================

#[test]
fn test_client_execute_status() {
    let (config, server) = spawn_server(vec![(
        b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n".to_vec(),
        b"+OK\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let reply = client.execute(&Command::new("SET").arg("k").arg("v")).unwrap();
    assert_eq!(reply, Reply::Single(Some(b"OK".to_vec())));
    assert_eq!(reply.format(), vec!["OK"]);

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_client_send_raw_and_read_array() {
    let (config, server) = spawn_server(vec![(
        b"*2\r\n$4\r\nKEYS\r\n$1\r\n*\r\n".to_vec(),
        b"*2\r\n$1\r\na\r\n$-1\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let written = client.send_raw(b"KEYS", &[b"*"]).unwrap();
    assert_eq!(written, 21);

    let reply = client.read_reply().unwrap();
    assert_eq!(reply.format(), vec!["0) \"a\"", "1) (nil)"]);

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_client_keeps_buffered_bytes_between_replies() {
    // The server answers the first request with two replies in one write
    let ping = b"*1\r\n$4\r\nPING\r\n".to_vec();
    let (config, server) = spawn_server(vec![(ping, b"+PONG\r\n$-1\r\n".to_vec())]);

    let mut client = Client::connect(&config).unwrap();
    assert_eq!(
        client.execute(&Command::new("PING")).unwrap(),
        Reply::Single(Some(b"PONG".to_vec()))
    );
    assert_eq!(client.read_reply().unwrap(), Reply::Single(None));

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_client_multiple_round_trips() {
    let (config, server) = spawn_server(vec![
        (
            b"*2\r\n$3\r\nGET\r\n$4\r\nmiss\r\n".to_vec(),
            b"$-1\r\n".to_vec(),
        ),
        (
            b"*2\r\n$6\r\nLRANGE\r\n$1\r\nl\r\n".to_vec(),
            b"*0\r\n".to_vec(),
        ),
    ]);

    let mut client = Client::connect(&config).unwrap();
    let first = client.execute(&Command::new("GET").arg("miss")).unwrap();
    assert_eq!(first.format(), vec!["(nil)"]);
    let second = client.execute(&Command::new("LRANGE").arg("l")).unwrap();
    assert_eq!(second.format(), vec!["(empty list or set)"]);

    client.close().unwrap();
    server.join().unwrap();
}

// =============================================================================
// Error Tests
// =============================================================================

#[test]
fn test_client_truncated_when_server_hangs_up() {
    let (config, server) = spawn_server(vec![(
        b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n".to_vec(),
        b"$10\r\nshort".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    client.send(&Command::new("GET").arg("k")).unwrap();
    server.join().unwrap();

    let err = client.read_reply().unwrap_err();
    assert!(matches!(err, ClientError::Truncated(_)));
}

#[test]
fn test_client_honours_bulk_limit() {
    let (config, server) = spawn_server(vec![(
        b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n".to_vec(),
        b"$5\r\nhello\r\n".to_vec(),
    )]);
    let config = Config {
        max_bulk_len: 4,
        ..config
    };

    let mut client = Client::connect(&config).unwrap();
    let err = client.execute(&Command::new("GET").arg("k")).unwrap_err();
    assert!(matches!(err, ClientError::ProtocolFormat(_)));

    server.join().unwrap();
}

#[test]
fn test_client_connect_refused() {
    // Bind then drop to get a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let config = Config::builder().host("127.0.0.1").port(port).build();

    let err = Client::connect(&config).err().unwrap();
    assert!(matches!(err, ClientError::Io(_)));
}

#[test]
fn test_client_unresolvable_host() {
    let config = Config::builder().host("no such host").port(6379).build();
    let err = Client::connect(&config).err().unwrap();
    assert!(matches!(err, ClientError::Config(_)));
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_session_blank_line_sends_nothing() {
    // The only request the server expects is the PING after the blank lines
    let (config, server) = spawn_server(vec![(
        b"*1\r\n$4\r\nPING\r\n".to_vec(),
        b"+PONG\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let mut out = Vec::new();

    assert_eq!(execute_line(&mut client, b"\n", &mut out).unwrap(), LineOutcome::Blank);
    assert_eq!(execute_line(&mut client, b" \t \r\n", &mut out).unwrap(), LineOutcome::Blank);
    assert!(out.is_empty());

    assert_eq!(execute_line(&mut client, b"PING\n", &mut out).unwrap(), LineOutcome::Replied);
    assert_eq!(out, b"PONG\n");

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_session_quit_only_without_arguments() {
    // `quit now` has an argument, so it goes to the server
    let (config, server) = spawn_server(vec![(
        b"*2\r\n$4\r\nquit\r\n$3\r\nnow\r\n".to_vec(),
        b"-ERR unknown command\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let mut out = Vec::new();

    assert_eq!(execute_line(&mut client, b"quit now\n", &mut out).unwrap(), LineOutcome::Replied);
    assert_eq!(out, b"ERR unknown command\n");

    assert_eq!(execute_line(&mut client, b"QUIT\n", &mut out).unwrap(), LineOutcome::Quit);
    assert_eq!(execute_line(&mut client, b"  exit  \n", &mut out).unwrap(), LineOutcome::Quit);

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_session_prints_every_formatted_line() {
    let (config, server) = spawn_server(vec![(
        b"*4\r\n$6\r\nLRANGE\r\n$1\r\nl\r\n$1\r\n0\r\n$2\r\n-1\r\n".to_vec(),
        b"*3\r\n$1\r\na\r\n$-1\r\n$1\r\nc\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let mut out = Vec::new();
    execute_line(&mut client, b"LRANGE l 0 -1", &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        "0) \"a\"\n1) (nil)\n2) \"c\"\n"
    );

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_session_sends_non_utf8_arguments() {
    let (config, server) = spawn_server(vec![(
        b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\n\xff\r\n".to_vec(),
        b"+OK\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let mut out = Vec::new();
    let outcome = execute_line(&mut client, b"SET k \xff\n", &mut out).unwrap();

    assert_eq!(outcome, LineOutcome::Replied);
    assert_eq!(out, b"OK\n");

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_session_script_stops_at_quit() {
    let (config, server) = spawn_server(vec![
        (
            b"*2\r\n$3\r\nGET\r\n$1\r\nk\r\n".to_vec(),
            b"$5\r\nvalue\r\n".to_vec(),
        ),
        (
            b"*2\r\n$3\r\nGET\r\n$4\r\n\xfe\xffxx\r\n".to_vec(),
            b"$-1\r\n".to_vec(),
        ),
    ]);

    let mut client = Client::connect(&config).unwrap();
    let mut input: &[u8] = b"\nGET k\n\nGET \xfe\xffxx\nquit\nGET never\n";
    let mut out = Vec::new();
    run_script(&mut client, &mut input, &mut out).unwrap();

    assert_eq!(out, b"value\n(nil)\n");
    assert_eq!(input, b"GET never\n");

    client.close().unwrap();
    server.join().unwrap();
}

#[test]
fn test_session_script_ends_at_eof_without_newline() {
    let (config, server) = spawn_server(vec![(
        b"*1\r\n$4\r\nPING\r\n".to_vec(),
        b"+PONG\r\n".to_vec(),
    )]);

    let mut client = Client::connect(&config).unwrap();
    let mut input: &[u8] = b"PING";
    let mut out = Vec::new();
    run_script(&mut client, &mut input, &mut out).unwrap();
    assert_eq!(out, b"PONG\n");

    client.close().unwrap();
    server.join().unwrap();
}
