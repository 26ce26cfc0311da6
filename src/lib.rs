//! # respcli
//!
//! An interactive client for RESP key-value servers:
//! - Binary-safe command encoding (array of bulk strings)
//! - Blocking reply decoding over any buffered reader
//! - Deterministic, redis-cli style formatting of replies
//! - A small TCP client, line-driven session and REPL binary on top
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        REPL (bin)                            │
//! │              (operator input / printed lines)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     TCP Client                               │
//! │            (one request, then one reply)                     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │   Decoder   │
//!   │  (Command)  │          │   (Reply)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │  Formatter  │
//!                           │  (lines)    │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod session;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ClientError, Result};
pub use config::Config;
pub use network::Client;
pub use protocol::{Command, Reply};
pub use session::LineOutcome;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respcli
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
