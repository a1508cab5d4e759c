use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::adapters::{CrawlMode, CrawlSettings, SearchSettings};
use crate::config::Overrides;
use crate::stdio::metadata::{all_tool_metadata, ToolCategory};

/// toolwire - MCP tool servers for Crawl4AI, SearxNG and pandoc
///
/// Each subcommand runs one stdio MCP server:
/// - crawl: crawl_webpage, crawl_single_url
/// - search: perform_web_search
/// - convert: convert_document
/// - search-crawl: search and crawl tools in one process
#[derive(Parser, Debug)]
#[command(name = "toolwire")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Tool server to run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to server_config.ini
    ///
    /// Defaults to the first existing server_config.ini next to the
    /// executable, in the working directory, or in the user config directory
    /// (e.g. ~/.config/toolwire/server_config.ini).
    #[arg(long, global = true, value_name = "PATH", env = "TOOLWIRE_CONFIG")]
    pub config: Option<PathBuf>,

    /// List available tool categories and exit
    #[arg(long)]
    pub list_categories: bool,

    /// List available tool names and exit
    #[arg(long)]
    pub list_tools: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the Crawl4AI crawl tools
    Crawl(CrawlOpts),

    /// Serve the SearxNG web search tool
    Search(SearchOpts),

    /// Serve the pandoc document conversion tool
    Convert(ConvertOpts),

    /// Serve the search and crawl tools from one process
    SearchCrawl(SearchCrawlOpts),
}

/// Crawl4AI connection and polling options
#[derive(Args, Debug, Clone)]
pub struct CrawlOpts {
    /// Crawl4AI base URL, overriding server_config.ini
    #[arg(long, value_name = "URL", env = "CRAWL4AI_API_URL")]
    pub crawl_url: Option<String>,

    /// Crawl4AI API token sent as a bearer token
    #[arg(long, value_name = "TOKEN", env = "CRAWL4AI_API_TOKEN", hide_env_values = true)]
    pub crawl_token: Option<String>,

    /// How to treat the crawl response: auto polls when a task_id is returned
    #[arg(long, value_enum, default_value_t = CrawlMode::Auto)]
    pub crawl_mode: CrawlMode,

    /// Timeout of the crawl request in seconds
    #[arg(long, value_name = "SECONDS", default_value = "120")]
    pub crawl_timeout: u64,

    /// Delay between task status polls in milliseconds
    #[arg(long, value_name = "MILLIS", default_value = "2000")]
    pub poll_interval_ms: u64,

    /// Timeout of each task status poll in seconds
    #[arg(long, value_name = "SECONDS", default_value = "10")]
    pub poll_timeout: u64,

    /// Stop polling a crawl task after this many seconds
    #[arg(long, value_name = "SECONDS", default_value = "60")]
    pub max_wait: u64,
}

/// SearxNG connection options
#[derive(Args, Debug, Clone)]
pub struct SearchOpts {
    /// SearxNG base URL, overriding server_config.ini
    #[arg(long, value_name = "URL", env = "SEARXNG_API_URL")]
    pub search_url: Option<String>,

    /// Timeout of each search request in seconds
    #[arg(long, value_name = "SECONDS", default_value = "60")]
    pub search_timeout: u64,

    /// Keep result titles next to url and content
    #[arg(long)]
    pub include_titles: bool,
}

/// pandoc options
#[derive(Args, Debug, Clone)]
pub struct ConvertOpts {
    /// pandoc executable to run
    #[arg(long, value_name = "PATH", env = "PANDOC_PATH", default_value = "pandoc")]
    pub pandoc_path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct SearchCrawlOpts {
    #[command(flatten)]
    pub search: SearchOpts,

    #[command(flatten)]
    pub crawl: CrawlOpts,
}

impl Commands {
    /// Tool categories this server hosts
    pub fn categories(&self) -> Vec<ToolCategory> {
        match self {
            Self::Crawl(_) => vec![ToolCategory::Crawl],
            Self::Search(_) => vec![ToolCategory::Search],
            Self::Convert(_) => vec![ToolCategory::Convert],
            Self::SearchCrawl(_) => vec![ToolCategory::Search, ToolCategory::Crawl],
        }
    }

    pub fn crawl_opts(&self) -> Option<&CrawlOpts> {
        match self {
            Self::Crawl(opts) => Some(opts),
            Self::SearchCrawl(opts) => Some(&opts.crawl),
            _ => None,
        }
    }

    pub fn search_opts(&self) -> Option<&SearchOpts> {
        match self {
            Self::Search(opts) => Some(opts),
            Self::SearchCrawl(opts) => Some(&opts.search),
            _ => None,
        }
    }

    pub fn convert_opts(&self) -> Option<&ConvertOpts> {
        match self {
            Self::Convert(opts) => Some(opts),
            _ => None,
        }
    }

    /// Whether an unresolved SearxNG endpoint should stop the server at startup
    ///
    /// The dedicated search server has nothing to offer without it; the
    /// combined server still serves the crawl tools.
    pub fn requires_search_endpoint(&self) -> bool {
        matches!(self, Self::Search(_))
    }

    /// Endpoint and token overrides given on the command line or environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            crawl_url: self.crawl_opts().and_then(|o| o.crawl_url.clone()),
            search_url: self.search_opts().and_then(|o| o.search_url.clone()),
            crawl_token: self.crawl_opts().and_then(|o| o.crawl_token.clone()),
        }
    }
}

impl CrawlOpts {
    pub fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            mode: self.crawl_mode,
            request_timeout: Duration::from_secs(self.crawl_timeout),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_timeout: Duration::from_secs(self.poll_timeout),
            max_wait: Duration::from_secs(self.max_wait),
        }
    }
}

impl SearchOpts {
    pub fn settings(&self) -> SearchSettings {
        SearchSettings {
            timeout: Duration::from_secs(self.search_timeout),
            include_titles: self.include_titles,
        }
    }
}

/// Get all available tool categories
pub fn available_categories() -> Vec<&'static str> {
    ToolCategory::ALL.iter().map(|c| c.name()).collect()
}

/// Get all available tool names
pub fn available_tools() -> Vec<&'static str> {
    all_tool_metadata().iter().map(|tool| tool.name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn crawl_defaults_match_adapter_defaults() {
        let cli = Cli::try_parse_from(["toolwire", "crawl"]).expect("parses");
        let Some(Commands::Crawl(opts)) = cli.command else {
            panic!("expected crawl subcommand");
        };
        let settings = opts.settings();
        let defaults = CrawlSettings::default();
        assert_eq!(settings.mode, defaults.mode);
        assert_eq!(settings.request_timeout, defaults.request_timeout);
        assert_eq!(settings.poll_interval, defaults.poll_interval);
        assert_eq!(settings.poll_timeout, defaults.poll_timeout);
        assert_eq!(settings.max_wait, defaults.max_wait);
    }

    #[test]
    fn search_crawl_collects_both_option_sets() {
        let cli = Cli::try_parse_from([
            "toolwire",
            "search-crawl",
            "--search-url",
            "http://searx:8080",
            "--crawl-url",
            "http://crawler:11235",
            "--crawl-mode",
            "async",
        ])
        .expect("parses");
        let command = cli.command.expect("subcommand");
        let overrides = command.overrides();
        assert_eq!(overrides.search_url.as_deref(), Some("http://searx:8080"));
        assert_eq!(overrides.crawl_url.as_deref(), Some("http://crawler:11235"));
        assert_eq!(command.crawl_opts().map(|o| o.crawl_mode), Some(CrawlMode::Async));
        assert_eq!(command.categories(), vec![ToolCategory::Search, ToolCategory::Crawl]);
        assert!(!command.requires_search_endpoint());
    }

    #[test]
    fn lists_every_tool() {
        assert_eq!(
            available_tools(),
            vec!["convert_document", "crawl_single_url", "crawl_webpage", "perform_web_search"]
        );
        assert_eq!(available_categories(), vec!["crawl", "search", "convert"]);
    }
}
