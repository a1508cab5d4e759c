// src/stdio/mod.rs
pub mod metadata;
pub mod server;

pub use server::{Adapters, ToolServer};
