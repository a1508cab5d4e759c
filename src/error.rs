//! Failure taxonomy shared by all adapters.
//!
//! Adapters return `Result<String, AdapterError>`; the MCP layer turns the
//! error side into a single `Error: ...` line with [`AdapterError::to_tool_text`].

use std::path::PathBuf;
use std::time::Duration;

use crate::config::ServiceKind;
use crate::transport::TransportError;

#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error(
        "{service} service address is not available. Please check server_config.ini or set {}.",
        .service.override_env()
    )]
    EndpointUnavailable { service: ServiceKind },

    #[error("{service} request failed. {source}")]
    Transport {
        service: ServiceKind,
        #[source]
        source: TransportError,
    },

    #[error("{0}")]
    UnexpectedResponse(String),

    #[error("No task_id received from Crawl4AI. Response: {0}")]
    MissingTaskId(String),

    #[error("Crawl task failed: {0}")]
    TaskFailed(String),

    #[error("Crawl task timed out after {} seconds", .0.as_secs_f64())]
    PollTimeout(Duration),

    #[error("{0}")]
    EmptyResults(&'static str),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("The input file '{}' was not found.", .0.display())]
    InputNotFound(PathBuf),

    #[error(
        "Could not determine the output format from '{}'. Please include a file extension (e.g., '.pdf', '.docx').",
        .0.display()
    )]
    MissingExtension(PathBuf),

    #[error("Conversion engine is not available: {0}")]
    EngineUnavailable(String),

    #[error("An error occurred during conversion: {0}")]
    ConversionFailed(String),
}

impl AdapterError {
    pub fn transport(service: ServiceKind, source: TransportError) -> Self {
        Self::Transport { service, source }
    }

    /// Render as the single-line text returned to tool callers.
    pub fn to_tool_text(&self) -> String {
        let message = self.to_string();
        let single_line = message.lines().map(str::trim).collect::<Vec<_>>().join(" ");
        format!("Error: {single_line}")
    }
}

/// Collapse an adapter result into the plain string returned over MCP.
pub fn into_tool_text(result: Result<String, AdapterError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Tool invocation failed: {e}");
            e.to_tool_text()
        }
    }
}
