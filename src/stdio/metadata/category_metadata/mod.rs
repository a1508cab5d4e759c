//! Static metadata for all tools.
//!
//! This module aggregates tool metadata from the per-category submodules so
//! tools can be listed without constructing any adapter.

use super::types::ToolMetadata;
use once_cell::sync::Lazy;

mod convert;
mod crawl;
mod search;

pub use convert::CONVERT_DOCUMENT;
pub use crawl::{CRAWL_SINGLE_URL, CRAWL_WEBPAGE};
pub use search::PERFORM_WEB_SEARCH;

use convert::convert_tools;
use crawl::crawl_tools;
use search::search_tools;

/// Tool name constants, grouped for callers that dispatch on them.
pub mod tool_names {
    pub use super::{CONVERT_DOCUMENT, CRAWL_SINGLE_URL, CRAWL_WEBPAGE, PERFORM_WEB_SEARCH};
}

/// All tools with static metadata, cached and sorted alphabetically.
static CACHED_TOOL_METADATA: Lazy<Vec<ToolMetadata>> = Lazy::new(|| {
    let mut tools = Vec::new();

    tools.extend(crawl_tools());
    tools.extend(search_tools());
    tools.extend(convert_tools());

    // Sort alphabetically by tool name for consistent ordering
    tools.sort_by(|a, b| a.name.cmp(b.name));

    tools
});

/// Returns a static reference to all tool metadata (cached, sorted).
pub fn all_tool_metadata() -> &'static [ToolMetadata] {
    &CACHED_TOOL_METADATA
}
