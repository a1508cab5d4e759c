//! Polling of asynchronous Crawl4AI tasks.

use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

use crate::config::{ServiceEndpoint, ServiceKind};
use crate::error::AdapterError;
use crate::transport::HttpTransport;

/// Remote task state as reported by `GET /task/{id}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Completed,
    Failed(String),
}

#[derive(Debug, Deserialize)]
struct TaskEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<Value>,
}

impl TaskState {
    pub fn of(response: &Value) -> Self {
        let envelope: TaskEnvelope = match serde_json::from_value(response.clone()) {
            Ok(envelope) => envelope,
            Err(_) => return Self::Pending,
        };

        match envelope.status.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("completed") => Self::Completed,
            Some("failed") => Self::Failed(match envelope.error {
                Some(Value::String(message)) if !message.is_empty() => message,
                Some(Value::Null) | None => "Unknown error".to_string(),
                Some(other) => other.to_string(),
            }),
            _ => Self::Pending,
        }
    }
}

/// Extract a task id from a crawl submission response.
pub fn task_id(response: &Value) -> Option<String> {
    match response.get("task_id")? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Timing knobs for the poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub interval: Duration,
    pub request_timeout: Duration,
    pub max_wait: Duration,
}

/// Poll the task until it completes, fails, or `max_wait` elapses.
///
/// Returns the completed payload. Some Crawl4AI versions nest it under
/// `result`; that object is unwrapped.
pub async fn wait_for_task(
    transport: &HttpTransport,
    endpoint: &ServiceEndpoint,
    task_id: &str,
    token: Option<&str>,
    schedule: PollSchedule,
) -> Result<Value, AdapterError> {
    let url = endpoint.join(&format!("task/{task_id}"));
    let started = Instant::now();
    let mut polls: u32 = 0;

    loop {
        polls += 1;
        let response = transport
            .get_json(&url, &[], token, schedule.request_timeout)
            .await
            .map_err(|e| AdapterError::transport(ServiceKind::Crawl, e))?;

        match TaskState::of(&response) {
            TaskState::Completed => {
                log::debug!("Crawl task {task_id} completed after {polls} poll(s)");
                return Ok(unwrap_result(response));
            }
            TaskState::Failed(reason) => {
                log::debug!("Crawl task {task_id} failed after {polls} poll(s): {reason}");
                return Err(AdapterError::TaskFailed(reason));
            }
            TaskState::Pending => {}
        }

        if started.elapsed() > schedule.max_wait {
            log::debug!("Crawl task {task_id} still pending after {polls} poll(s), giving up");
            return Err(AdapterError::PollTimeout(schedule.max_wait));
        }

        tokio::time::sleep(schedule.interval).await;
    }
}

fn unwrap_result(response: Value) -> Value {
    match response {
        Value::Object(mut map) if !map.contains_key("results") && !map.contains_key("markdown") => {
            match map.remove("result") {
                Some(inner @ Value::Object(_)) => inner,
                Some(other) => {
                    map.insert("result".to_string(), other);
                    Value::Object(map)
                }
                None => Value::Object(map),
            }
        }
        other => other,
    }
}
