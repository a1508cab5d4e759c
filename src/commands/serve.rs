use anyhow::{Context, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;

use crate::adapters::{ConvertAdapter, CrawlAdapter, PandocEngine, SearchAdapter};
use crate::cli::Commands;
use crate::config::{locate_config_file, ResolvedServices, ServerSettings};
use crate::stdio::{Adapters, ToolServer};
use crate::transport::HttpTransport;

/// Resolve configuration, build the adapters for `command`, and serve stdio
/// until the client disconnects or `shutdown` fires.
pub async fn handle_serve(
    command: &Commands,
    config_path: Option<&Path>,
    shutdown: CancellationToken,
) -> Result<()> {
    let settings = match locate_config_file(config_path) {
        Some(path) => {
            log::info!("Reading server config from {}", path.display());
            ServerSettings::load(&path)
        }
        None => {
            log::info!("No server_config.ini found, using defaults and overrides");
            ServerSettings::default()
        }
    };

    let services = ResolvedServices::resolve(&settings, &command.overrides());

    if command.requires_search_endpoint() && services.search.is_none() {
        anyhow::bail!(
            "SearxNG server address not found: set server_ip in server_config.ini or pass --search-url"
        );
    }

    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let adapters = build_adapters(command, &services, &transport);
    report_adapters(&adapters);

    ToolServer::new(adapters).serve_stdio(shutdown).await
}

/// Construct the adapters a subcommand hosts from resolved services.
pub fn build_adapters(
    command: &Commands,
    services: &ResolvedServices,
    transport: &HttpTransport,
) -> Adapters<PandocEngine> {
    Adapters {
        crawl: command.crawl_opts().map(|opts| {
            CrawlAdapter::new(
                services.crawl.clone(),
                services.crawl_token.clone(),
                transport.clone(),
                opts.settings(),
            )
        }),
        search: command.search_opts().map(|opts| {
            SearchAdapter::new(services.search.clone(), transport.clone(), opts.settings())
        }),
        convert: command
            .convert_opts()
            .map(|opts| ConvertAdapter::new(PandocEngine::new(opts.pandoc_path.clone()))),
    }
}

fn report_adapters(adapters: &Adapters<PandocEngine>) {
    if let Some(search) = &adapters.search {
        match search.endpoint() {
            Some(endpoint) => log::info!("SearxNG configured at: {endpoint}"),
            None => log::warn!("SearxNG address not found in server_config.ini (search will fail)"),
        }
    }

    if let Some(crawl) = &adapters.crawl {
        match crawl.endpoint() {
            Some(endpoint) => log::info!("Crawl4AI configured at: {endpoint}"),
            None => log::warn!("Crawl4AI address not found (crawl will fail)"),
        }
        if crawl.has_token() {
            log::info!("Crawl4AI API token configured");
        } else {
            log::warn!("Crawl4AI API token not set (authentication may fail)");
        }
    }

    if let Some(convert) = &adapters.convert {
        log::info!("Document conversion via {}", convert.engine().binary().display());
    }
}
