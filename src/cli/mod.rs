mod types;

pub use types::{
    available_categories, available_tools, Cli, Commands, ConvertOpts, CrawlOpts, SearchCrawlOpts,
    SearchOpts,
};
