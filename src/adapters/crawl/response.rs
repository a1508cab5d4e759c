//! Decoding and rendering of Crawl4AI crawl payloads.

use serde::Deserialize;
use serde_json::Value;

use crate::error::AdapterError;

/// Separator placed between the rendered pages of a multi-URL crawl.
pub const RESULT_SEPARATOR: &str = "\n---\n";

const NO_CONTENT: &str = "No content found.";

/// The `markdown` field of a page, which Crawl4AI emits either as a string or
/// as an object carrying `raw_markdown`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MarkdownField {
    Plain(String),
    Structured(MarkdownResult),
    /// Any other shape (object without `raw_markdown`, array, number).
    Other(Value),
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarkdownResult {
    pub raw_markdown: String,
}

impl MarkdownField {
    /// Markdown text, if this field carries any.
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            Self::Plain(text) => text.as_str(),
            Self::Structured(result) => result.raw_markdown.as_str(),
            Self::Other(_) => return None,
        };
        (!text.trim().is_empty()).then_some(text)
    }
}

/// One entry of a `results` list.
#[derive(Debug, Clone, Deserialize)]
pub struct PageResult {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub markdown: Option<MarkdownField>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
}

impl PageResult {
    /// Extracted page content: markdown, then html, then a placeholder.
    pub fn content(&self) -> String {
        if let Some(text) = self.markdown.as_ref().and_then(MarkdownField::text) {
            return text.to_string();
        }
        if let Some(html) = self.html.as_deref().filter(|html| !html.trim().is_empty()) {
            return html.to_string();
        }
        match (self.success, self.error_message.as_deref()) {
            (Some(false), Some(message)) if !message.trim().is_empty() => {
                format!("Crawl failed: {message}")
            }
            _ => NO_CONTENT.to_string(),
        }
    }

    fn render(&self) -> String {
        let url = self.url.as_deref().unwrap_or("Unknown URL");
        format!("# Source: {url}\n\n{}\n", self.content())
    }
}

/// Synchronous crawl payload (also the payload of a completed task).
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlPayload {
    #[serde(default)]
    pub results: Option<Vec<PageResult>>,
    #[serde(default)]
    pub markdown: Option<MarkdownField>,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub status: Option<Value>,
}

/// Normalize a crawl payload into text.
pub fn render_payload(value: Value) -> Result<String, AdapterError> {
    let keys = match &value {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>(),
        _ => Vec::new(),
    };

    let payload: CrawlPayload = serde_json::from_value(value).map_err(|e| {
        AdapterError::UnexpectedResponse(format!(
            "Crawl response could not be decoded ({e}). Keys received: {keys:?}"
        ))
    })?;

    if let Some(results) = payload.results {
        if results.is_empty() {
            return Err(AdapterError::EmptyResults("No results returned from crawl."));
        }
        return Ok(results
            .iter()
            .map(PageResult::render)
            .collect::<Vec<_>>()
            .join(RESULT_SEPARATOR));
    }

    if let Some(text) = payload.markdown.as_ref().and_then(MarkdownField::text) {
        return Ok(text.to_string());
    }

    if let Some(html) = payload.html {
        let status = match payload.status {
            Some(Value::String(status)) => status,
            Some(other) => other.to_string(),
            None => "unknown".to_string(),
        };
        return Ok(format!(
            "Markdown not returned, raw length: {} chars. Status: {status}",
            html.chars().count()
        ));
    }

    if payload.markdown.is_some() {
        return Ok(NO_CONTENT.to_string());
    }

    Err(AdapterError::UnexpectedResponse(format!(
        "Crawl successful but unexpected response format. Keys received: {keys:?}"
    )))
}
