//! Network Module
//!
//! Blocking TCP client.
//!
//! ## Model
//! - One connection, one buffered reader kept for its lifetime
//! - Strict request-then-reply; no pipelining
//! - Any decode error leaves the connection unusable

mod client;

pub use client::Client;
