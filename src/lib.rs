//! MCP tool servers exposing Crawl4AI, SearxNG and pandoc.
//!
//! Each adapter resolves its service endpoint once at startup, performs a
//! single HTTP exchange (or a short poll loop) per invocation, and returns
//! plain text. Failures are returned as `Error: ...` text, never as protocol
//! faults.

pub mod adapters;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod stdio;
pub mod transport;

pub use error::AdapterError;
