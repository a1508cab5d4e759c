//! Web crawling tools backed by Crawl4AI

use crate::adapters::{CrawlArgs, CrawlSingleArgs};
use crate::stdio::metadata::routing::ToolCategory;
use crate::stdio::metadata::types::{build_schema, ToolMetadata};

pub const CRAWL_WEBPAGE: &str = "crawl_webpage";
pub const CRAWL_SINGLE_URL: &str = "crawl_single_url";

pub fn crawl_tools() -> Vec<ToolMetadata> {
    vec![
        ToolMetadata {
            name: CRAWL_WEBPAGE,
            category: ToolCategory::Crawl,
            description: "Read and extract the main content from a LIST of URLs as markdown. Use this when several pages must be read, e.g. URLs found by a web search. Pages are separated by '---' dividers. Optional js_code runs before extraction, wait_for waits for a CSS selector, css_selector limits extraction to part of the page.",
            schema: build_schema::<CrawlArgs>(),
        },
        ToolMetadata {
            name: CRAWL_SINGLE_URL,
            category: ToolCategory::Crawl,
            description: "Read and extract the main content from a SINGLE URL as markdown. Convenience wrapper around crawl_webpage for one page; accepts the same optional js_code, wait_for and css_selector.",
            schema: build_schema::<CrawlSingleArgs>(),
        },
    ]
}
