//! respcli Binary
//!
//! Interactive REPL for a RESP server.

use std::io::{self, IsTerminal};

use clap::Parser;
use respcli::session::{execute_line, run_script};
use respcli::{Client, ClientError, Config, LineOutcome, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing_subscriber::{fmt, EnvFilter};

/// respcli
#[derive(Parser, Debug)]
#[command(name = "respcli")]
#[command(about = "Interactive client for RESP key-value servers")]
#[command(version)]
struct Args {
    /// Server hostname
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port
    #[arg(short, long, default_value = "6379")]
    port: u16,

    /// Execute a single command and exit
    #[arg(short, long)]
    command: Option<String>,

    /// Connect/read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "0")]
    timeout: u64,
}

fn main() {
    // Logs go to stderr so they never mix with reply output
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    tracing::debug!("respcli v{}", respcli::VERSION);

    let config = Config::builder()
        .host(&args.host)
        .port(args.port)
        .connect_timeout_ms(args.timeout)
        .read_timeout_ms(args.timeout)
        .write_timeout_ms(args.timeout)
        .build();

    let mut client = match Client::connect(&config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", config.addr(), e);
            std::process::exit(1);
        }
    };

    // Prompt matches redis-cli: `host:port>`
    let prompt = format!("{}>", config.addr());

    let result = match args.command {
        Some(line) => execute_line(&mut client, line.as_bytes(), &mut io::stdout()).map(|_| ()),
        None if io::stdin().is_terminal() => run_interactive(&mut client, &prompt),
        // Piped input is read as raw bytes without a prompt
        None => run_script(&mut client, &mut io::stdin().lock(), &mut io::stdout()),
    };

    if let Err(e) = result {
        // The stream is unusable after any failure here
        tracing::error!("Session with {} ended: {}", config.addr(), e);
        std::process::exit(1);
    }

    if let Err(e) = client.close() {
        tracing::warn!("Error closing connection: {}", e);
    }
}

/// Prompt with line editing and history until Ctrl-C, Ctrl-D or `quit`
fn run_interactive(client: &mut Client, prompt: &str) -> Result<()> {
    let mut editor = DefaultEditor::new().map_err(readline_error)?;
    let mut out = io::stdout();

    loop {
        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                if execute_line(client, line.as_bytes(), &mut out)? == LineOutcome::Quit {
                    return Ok(());
                }
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => return Ok(()),
            Err(ReadlineError::Io(e)) => return Err(e.into()),
            // Nothing was sent, so the connection is still in sync
            Err(e) => tracing::warn!("Ignoring unreadable input: {}", e),
        }
    }
}

fn readline_error(e: ReadlineError) -> ClientError {
    match e {
        ReadlineError::Io(e) => ClientError::Io(e),
        other => ClientError::Io(io::Error::new(io::ErrorKind::Other, other.to_string())),
    }
}
