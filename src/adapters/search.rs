//! SearxNG adapter: `perform_web_search`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::{ServiceEndpoint, ServiceKind};
use crate::error::AdapterError;
use crate::transport::HttpTransport;

fn default_pageno() -> u32 {
    1
}

/// Arguments of `perform_web_search`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchArgs {
    /// The search keywords or question.
    pub query: String,

    /// Page number of results (1-based, default: 1).
    #[serde(default = "default_pageno")]
    pub pageno: u32,
}

/// Search adapter behavior.
#[derive(Debug, Clone, Copy)]
pub struct SearchSettings {
    pub timeout: Duration,
    /// Keep each hit's `title` alongside `url` and `content`.
    pub include_titles: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            include_titles: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<RawHit>,
}

/// Upstream hit; all fields other than these are discarded.
#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Normalized hit returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub url: Option<String>,
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SearchAdapter {
    endpoint: Option<ServiceEndpoint>,
    transport: HttpTransport,
    settings: SearchSettings,
}

impl SearchAdapter {
    pub fn new(
        endpoint: Option<ServiceEndpoint>,
        transport: HttpTransport,
        settings: SearchSettings,
    ) -> Self {
        Self {
            endpoint,
            transport,
            settings,
        }
    }

    pub fn endpoint(&self) -> Option<&ServiceEndpoint> {
        self.endpoint.as_ref()
    }

    /// Run a search and return a JSON array of hits, or a "no results" line.
    pub async fn search(&self, args: &SearchArgs) -> Result<String, AdapterError> {
        let endpoint = self
            .endpoint
            .as_ref()
            .ok_or(AdapterError::EndpointUnavailable {
                service: ServiceKind::Search,
            })?;

        let query = args.query.trim();
        if query.is_empty() {
            return Err(AdapterError::InvalidArgument("query must not be empty".to_string()));
        }
        if args.pageno == 0 {
            return Err(AdapterError::InvalidArgument("pageno must be 1 or greater".to_string()));
        }

        let url = endpoint.join("search");
        log::debug!("Searching '{query}' (page {}) via {url}", args.pageno);

        let params = [
            ("q", query.to_string()),
            ("format", "json".to_string()),
            ("pageno", args.pageno.to_string()),
        ];
        let response = self
            .transport
            .get_json(&url, &params, None, self.settings.timeout)
            .await
            .map_err(|e| AdapterError::transport(ServiceKind::Search, e))?;

        let hits = normalize_hits(response, self.settings.include_titles)?;
        if hits.is_empty() {
            return Ok(format!("No results found for '{query}' on page {}.", args.pageno));
        }

        serde_json::to_string(&hits).map_err(|e| {
            AdapterError::UnexpectedResponse(format!("Failed to encode search results: {e}"))
        })
    }
}

fn normalize_hits(response: Value, include_titles: bool) -> Result<Vec<SearchHit>, AdapterError> {
    let decoded: SearchResponse = serde_json::from_value(response).map_err(|e| {
        AdapterError::UnexpectedResponse(format!("SearxNG returned an unexpected response: {e}"))
    })?;

    Ok(decoded
        .results
        .into_iter()
        .map(|hit| SearchHit {
            url: hit.url,
            content: hit.content,
            title: if include_titles { hit.title } else { None },
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keeps_only_url_and_content() {
        let hits = normalize_hits(
            json!({"results": [{"url": "https://a", "content": "c", "title": "t", "engine": "ddg", "score": 1.0}]}),
            false,
        )
        .expect("normalizes");
        assert_eq!(
            serde_json::to_value(&hits).expect("serializes"),
            json!([{"url": "https://a", "content": "c"}])
        );
    }

    #[test]
    fn titles_are_opt_in() {
        let hits = normalize_hits(json!({"results": [{"url": "https://a", "title": "t"}]}), true)
            .expect("normalizes");
        assert_eq!(hits[0].title.as_deref(), Some("t"));
        assert_eq!(hits[0].content, None);
    }

    #[test]
    fn missing_results_key_is_empty() {
        assert!(normalize_hits(json!({"query": "x"}), false).expect("normalizes").is_empty());
    }

    #[test]
    fn pageno_defaults_to_one() {
        let args: SearchArgs = serde_json::from_value(json!({"query": "rust"})).expect("decodes");
        assert_eq!(args.pageno, 1);
    }
}
