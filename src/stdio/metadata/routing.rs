//! Tool categories and the tool-name routing table.

use std::collections::HashMap;
use std::fmt;

use super::category_metadata::all_tool_metadata;

/// Group of tools backed by one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ToolCategory {
    Crawl,
    Search,
    Convert,
}

impl ToolCategory {
    pub const ALL: [ToolCategory; 3] = [Self::Crawl, Self::Search, Self::Convert];

    pub fn name(self) -> &'static str {
        match self {
            Self::Crawl => "crawl",
            Self::Search => "search",
            Self::Convert => "convert",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build routing table: tool_name -> category
pub fn build_routing_table() -> HashMap<&'static str, ToolCategory> {
    all_tool_metadata()
        .iter()
        .map(|tool| (tool.name, tool.category))
        .collect()
}
