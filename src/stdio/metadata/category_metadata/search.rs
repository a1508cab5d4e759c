//! Web search through a SearxNG instance

use crate::adapters::SearchArgs;
use crate::stdio::metadata::routing::ToolCategory;
use crate::stdio::metadata::types::{build_schema, ToolMetadata};

pub const PERFORM_WEB_SEARCH: &str = "perform_web_search";

pub fn search_tools() -> Vec<ToolMetadata> {
    vec![ToolMetadata {
        name: PERFORM_WEB_SEARCH,
        category: ToolCategory::Search,
        description: "Perform a web search and return a JSON list of results, each with 'url' and 'content' (a short snippet for judging relevance). Use it for current events, facts that change over time, or to find documentation URLs; then read full pages with crawl_webpage or crawl_single_url. pageno selects the 1-based result page.",
        schema: build_schema::<SearchArgs>(),
    }]
}
