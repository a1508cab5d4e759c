//! Crawl4AI adapter: `crawl_webpage` and `crawl_single_url`.

mod poll;
mod response;

pub use poll::{task_id, wait_for_task, PollSchedule, TaskState};
pub use response::{render_payload, CrawlPayload, MarkdownField, MarkdownResult, PageResult, RESULT_SEPARATOR};

use reqwest::Url;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{ServiceEndpoint, ServiceKind};
use crate::error::AdapterError;
use crate::transport::HttpTransport;

/// How the adapter treats the response to `POST /crawl`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CrawlMode {
    /// Poll when the response carries a `task_id`, otherwise read it directly.
    #[default]
    Auto,
    /// Always read the response as the crawl result.
    Sync,
    /// Require a `task_id` and poll for the result.
    Async,
}

/// Timeouts and polling behavior of the crawl adapter.
#[derive(Debug, Clone, Copy)]
pub struct CrawlSettings {
    pub mode: CrawlMode,
    /// Timeout of the `POST /crawl` request.
    pub request_timeout: Duration,
    /// Delay between two `GET /task/{id}` polls.
    pub poll_interval: Duration,
    /// Timeout of each poll request.
    pub poll_timeout: Duration,
    /// Give up polling after this long.
    pub max_wait: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            mode: CrawlMode::Auto,
            request_timeout: Duration::from_secs(120),
            poll_interval: Duration::from_secs(2),
            poll_timeout: Duration::from_secs(10),
            max_wait: Duration::from_secs(60),
        }
    }
}

fn default_bypass_cache() -> bool {
    true
}

/// Per-page crawl options shared by both crawl tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PageOptions {
    /// Optional JavaScript to execute on the pages before extraction (e.g., "window.scrollTo(0, document.body.scrollHeight);").
    #[serde(default)]
    pub js_code: Option<String>,

    /// Optional CSS selector to wait for before scraping (ensures dynamic content is loaded).
    #[serde(default)]
    pub wait_for: Option<String>,

    /// Optional CSS selector limiting the result to part of the page (e.g., "main" or ".article-body").
    #[serde(default)]
    pub css_selector: Option<String>,

    /// Whether to include raw HTML in the response (default: false).
    #[serde(default)]
    pub include_raw_html: bool,

    /// Whether to force a fresh crawl and ignore cached results (default: true).
    #[serde(default = "default_bypass_cache")]
    pub bypass_cache: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            js_code: None,
            wait_for: None,
            css_selector: None,
            include_raw_html: false,
            bypass_cache: true,
        }
    }
}

/// Arguments of `crawl_webpage`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrawlArgs {
    /// A list of full URLs to crawl (e.g., ["https://example.com", "https://another.com"]).
    pub urls: Vec<String>,

    #[serde(flatten)]
    pub options: PageOptions,
}

/// Arguments of `crawl_single_url`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CrawlSingleArgs {
    /// The single full URL to crawl (e.g., "https://example.com").
    pub url: String,

    #[serde(flatten)]
    pub options: PageOptions,
}

/// JSON body of `POST /crawl`.
#[derive(Debug, Serialize)]
struct CrawlRequestBody<'a> {
    urls: &'a [String],
    include_raw_html: bool,
    bypass_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    js_code: Option<Vec<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    wait_for: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    css_selector: Option<&'a str>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl<'a> CrawlRequestBody<'a> {
    fn new(urls: &'a [String], options: &'a PageOptions) -> Self {
        Self {
            urls,
            include_raw_html: options.include_raw_html,
            bypass_cache: options.bypass_cache,
            js_code: non_blank(&options.js_code).map(|code| vec![code]),
            wait_for: non_blank(&options.wait_for),
            css_selector: non_blank(&options.css_selector),
        }
    }
}

/// Adapter for the Crawl4AI HTTP API.
#[derive(Debug, Clone)]
pub struct CrawlAdapter {
    endpoint: Option<ServiceEndpoint>,
    token: Option<String>,
    transport: HttpTransport,
    settings: CrawlSettings,
}

impl CrawlAdapter {
    pub fn new(
        endpoint: Option<ServiceEndpoint>,
        token: Option<String>,
        transport: HttpTransport,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            endpoint,
            token,
            transport,
            settings,
        }
    }

    pub fn endpoint(&self) -> Option<&ServiceEndpoint> {
        self.endpoint.as_ref()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Crawl every URL in `args.urls` and return the concatenated content.
    pub async fn crawl(&self, args: &CrawlArgs) -> Result<String, AdapterError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(AdapterError::EndpointUnavailable {
                service: ServiceKind::Crawl,
            })?;

        validate_urls(&args.urls)?;

        let url = endpoint.join("crawl");
        let body = CrawlRequestBody::new(&args.urls, &args.options);
        log::debug!("Crawling {} URL(s) via {url}", args.urls.len());

        let response = self
            .transport
            .post_json(&url, &body, self.token.as_deref(), self.settings.request_timeout)
            .await
            .map_err(|e| AdapterError::transport(ServiceKind::Crawl, e))?;

        let payload = match (self.settings.mode, task_id(&response)) {
            (CrawlMode::Sync, _) => response,
            (_, Some(id)) => {
                log::info!("Crawl task started: {id}");
                wait_for_task(&self.transport, endpoint, &id, self.token.as_deref(), self.schedule()).await?
            }
            (CrawlMode::Async, None) => {
                return Err(AdapterError::MissingTaskId(response.to_string()));
            }
            (CrawlMode::Auto, None) => response,
        };

        render_payload(payload)
    }

    /// Convenience wrapper over [`CrawlAdapter::crawl`] for one URL.
    pub async fn crawl_single(&self, args: CrawlSingleArgs) -> Result<String, AdapterError> {
        let args = CrawlArgs {
            urls: vec![args.url],
            options: args.options,
        };
        self.crawl(&args).await
    }

    fn schedule(&self) -> PollSchedule {
        PollSchedule {
            interval: self.settings.poll_interval,
            request_timeout: self.settings.poll_timeout,
            max_wait: self.settings.max_wait,
        }
    }
}

fn validate_urls(urls: &[String]) -> Result<(), AdapterError> {
    if urls.is_empty() {
        return Err(AdapterError::InvalidArgument(
            "urls must contain at least one URL".to_string(),
        ));
    }

    for raw in urls {
        let valid = Url::parse(raw)
            .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
            .unwrap_or(false);
        if !valid {
            return Err(AdapterError::InvalidArgument(format!(
                "'{raw}' is not an absolute http(s) URL"
            )));
        }
    }

    Ok(())
}
