//! Service adapters, one per external dependency.

pub mod convert;
pub mod crawl;
pub mod search;

pub use convert::{ConversionEngine, ConversionJob, ConvertAdapter, ConvertArgs, EngineError, PandocEngine};
pub use crawl::{CrawlAdapter, CrawlArgs, CrawlMode, CrawlSettings, CrawlSingleArgs, PageOptions};
pub use search::{SearchAdapter, SearchArgs, SearchHit, SearchSettings};
