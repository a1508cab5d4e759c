//! Static tool metadata for the stdio servers.
//!
//! Every tool is described once here (name, category, description, schema)
//! so the server can list tools without touching the adapters.

mod category_metadata;
mod routing;
mod types;

pub use category_metadata::{all_tool_metadata, tool_names};
pub use routing::{build_routing_table, ToolCategory};
pub use types::ToolMetadata;
