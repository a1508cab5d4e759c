// src/stdio/server.rs
use anyhow::Result;
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler, ServiceExt,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, JsonObject,
        ListToolsResult, PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
        Tool,
    },
    service::RequestContext,
    transport::stdio,
};
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::metadata::{all_tool_metadata, build_routing_table, tool_names, ToolCategory};
use crate::adapters::{
    ConversionEngine, ConvertAdapter, ConvertArgs, CrawlAdapter, PandocEngine, SearchAdapter,
    SearchArgs,
};
use crate::error::{into_tool_text, AdapterError};

/// Adapters hosted by one server process. A `None` adapter means its tools
/// are neither listed nor callable.
#[derive(Debug, Clone)]
pub struct Adapters<E = PandocEngine> {
    pub crawl: Option<CrawlAdapter>,
    pub search: Option<SearchAdapter>,
    pub convert: Option<ConvertAdapter<E>>,
}

impl<E> Default for Adapters<E> {
    fn default() -> Self {
        Self {
            crawl: None,
            search: None,
            convert: None,
        }
    }
}

impl<E> Adapters<E> {
    /// Categories whose adapter is present.
    pub fn categories(&self) -> BTreeSet<ToolCategory> {
        let mut categories = BTreeSet::new();
        if self.crawl.is_some() {
            categories.insert(ToolCategory::Crawl);
        }
        if self.search.is_some() {
            categories.insert(ToolCategory::Search);
        }
        if self.convert.is_some() {
            categories.insert(ToolCategory::Convert);
        }
        categories
    }
}

/// MCP server exposing the adapters over stdio.
///
/// Every adapter outcome, success or failure, is returned as text content;
/// only an unknown or disabled tool name is a protocol error.
pub struct ToolServer<E = PandocEngine> {
    adapters: Arc<Adapters<E>>,

    /// Routing table: tool_name -> category
    routing_table: HashMap<&'static str, ToolCategory>,

    /// Categories with a live adapter
    enabled: BTreeSet<ToolCategory>,
}

impl<E: ConversionEngine + 'static> ToolServer<E> {
    pub fn new(adapters: Adapters<E>) -> Self {
        let enabled = adapters.categories();
        log::info!(
            "Tool server initialized with categories: {}",
            enabled.iter().map(|c| c.name()).collect::<Vec<_>>().join(", ")
        );

        Self {
            adapters: Arc::new(adapters),
            routing_table: build_routing_table(),
            enabled,
        }
    }

    /// Names of the tools this server exposes, sorted.
    pub fn tool_names(&self) -> Vec<&'static str> {
        all_tool_metadata()
            .iter()
            .filter(|tool| self.enabled.contains(&tool.category))
            .map(|tool| tool.name)
            .collect()
    }

    /// Run one tool invocation and return its text result.
    pub async fn dispatch(
        &self,
        tool_name: &str,
        arguments: Option<JsonObject>,
    ) -> Result<String, McpError> {
        let category = self
            .routing_table
            .get(tool_name)
            .copied()
            .ok_or_else(|| McpError::invalid_params(format!("Unknown tool: {tool_name}"), None))?;

        let adapters = &self.adapters;
        let not_enabled = || {
            McpError::invalid_params(format!("Tool '{tool_name}' is not enabled on this server"), None)
        };

        log::debug!("Dispatching tool call '{tool_name}' to {category} adapter");

        let result = match category {
            ToolCategory::Crawl => {
                let crawl = adapters.crawl.as_ref().ok_or_else(not_enabled)?;
                call_crawl(crawl, tool_name, arguments).await
            }
            ToolCategory::Search => {
                let search = adapters.search.as_ref().ok_or_else(not_enabled)?;
                call_search(search, tool_name, arguments).await
            }
            ToolCategory::Convert => {
                let convert = adapters.convert.as_ref().ok_or_else(not_enabled)?;
                call_convert(convert, tool_name, arguments).await
            }
        };

        Ok(into_tool_text(result))
    }

    /// Serve over stdio until the client disconnects or `shutdown` fires.
    pub async fn serve_stdio(self, shutdown: CancellationToken) -> Result<()> {
        log::info!("Starting stdio server");

        let service = self
            .serve_with_ct(stdio(), shutdown)
            .await
            .inspect_err(|e| {
                log::error!("serving error: {e:?}");
            })?;
        let reason = service.waiting().await?;

        log::info!("Stdio server stopped: {reason:?}");
        Ok(())
    }
}

async fn call_crawl(
    crawl: &CrawlAdapter,
    tool_name: &str,
    arguments: Option<JsonObject>,
) -> Result<String, AdapterError> {
    if tool_name == tool_names::CRAWL_SINGLE_URL {
        return crawl.crawl_single(parse_args(tool_name, arguments)?).await;
    }
    crawl.crawl(&parse_args(tool_name, arguments)?).await
}

async fn call_search(
    search: &SearchAdapter,
    tool_name: &str,
    arguments: Option<JsonObject>,
) -> Result<String, AdapterError> {
    let args: SearchArgs = parse_args(tool_name, arguments)?;
    search.search(&args).await
}

async fn call_convert<E: ConversionEngine>(
    convert: &ConvertAdapter<E>,
    tool_name: &str,
    arguments: Option<JsonObject>,
) -> Result<String, AdapterError> {
    let args: ConvertArgs = parse_args(tool_name, arguments)?;
    convert.convert(&args).await
}

fn parse_args<T: DeserializeOwned>(
    tool_name: &str,
    arguments: Option<JsonObject>,
) -> Result<T, AdapterError> {
    let value = serde_json::Value::Object(arguments.unwrap_or_default());
    serde_json::from_value(value).map_err(|e| {
        AdapterError::InvalidArgument(format!("invalid arguments for {tool_name}: {e}"))
    })
}

impl<E: ConversionEngine + 'static> ServerHandler for ToolServer<E> {
    fn get_info(&self) -> ServerInfo {
        let categories = self
            .enabled
            .iter()
            .map(|c| c.name())
            .collect::<Vec<_>>()
            .join(", ");

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "toolwire stdio server ({categories}). Tool results are plain text; failures start with 'Error:'."
            )),
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let text = self.dispatch(&request.name, request.arguments).await?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let mut tools = Vec::new();

        for tool_meta in all_tool_metadata() {
            if !self.enabled.contains(&tool_meta.category) {
                continue;
            }

            // Convert schema Value to Arc<JsonObject>
            let schema_obj = match tool_meta.schema.clone() {
                serde_json::Value::Object(obj) => Arc::new(obj),
                _ => Arc::new(serde_json::Map::new()),
            };

            tools.push(Tool::new(tool_meta.name, tool_meta.description, schema_obj));
        }

        log::debug!("Serving {} tools from static metadata", tools.len());

        Ok(ListToolsResult::with_all_items(tools))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{ConversionJob, EngineError};
    use serde_json::json;

    struct NoopEngine;

    impl ConversionEngine for NoopEngine {
        async fn convert(&self, _job: &ConversionJob) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn convert_only() -> ToolServer<NoopEngine> {
        ToolServer::new(Adapters {
            convert: Some(ConvertAdapter::new(NoopEngine)),
            ..Adapters::default()
        })
    }

    fn object(value: serde_json::Value) -> Option<JsonObject> {
        value.as_object().cloned()
    }

    #[test]
    fn lists_only_enabled_tools() {
        assert_eq!(convert_only().tool_names(), vec!["convert_document"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let err = convert_only().dispatch("no_such_tool", None).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn disabled_tool_is_protocol_error() {
        let err = convert_only()
            .dispatch("perform_web_search", object(json!({"query": "rust"})))
            .await
            .expect_err("search is not hosted");
        assert!(err.message.contains("not enabled"), "got: {}", err.message);
    }

    #[tokio::test]
    async fn crawl_tools_route_to_their_own_arguments() {
        let server: ToolServer<NoopEngine> = ToolServer::new(Adapters {
            crawl: Some(CrawlAdapter::new(
                None,
                None,
                crate::transport::HttpTransport::new().expect("client builds"),
                crate::adapters::CrawlSettings::default(),
            )),
            ..Adapters::default()
        });

        let single = server
            .dispatch("crawl_single_url", object(json!({"urls": ["https://a.dev"]})))
            .await
            .expect("adapter errors are text");
        assert!(single.starts_with("Error: Invalid argument: invalid arguments for crawl_single_url"));

        let many = server
            .dispatch("crawl_webpage", object(json!({"urls": ["https://a.dev"]})))
            .await
            .expect("adapter errors are text");
        assert!(many.starts_with("Error: Crawl4AI service address is not available"), "got: {many}");
    }

    #[tokio::test]
    async fn bad_arguments_become_error_text() {
        let text = convert_only()
            .dispatch("convert_document", object(json!({"input_path": "a.md"})))
            .await
            .expect("adapter errors are text");
        assert!(text.starts_with("Error: Invalid argument: invalid arguments for convert_document"));
    }

    #[tokio::test]
    async fn adapter_errors_become_error_text() {
        let text = convert_only()
            .dispatch(
                "convert_document",
                object(json!({"input_path": "a.md", "output_path": "b"})),
            )
            .await
            .expect("adapter errors are text");
        assert!(text.starts_with("Error: Could not determine the output format"));
    }
}
