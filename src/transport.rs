//! Single-shot HTTP requests returning decoded JSON.
//!
//! No retries are performed. Every failure is mapped to a [`TransportError`]
//! carrying the target URL and whatever detail is available.

use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

/// Longest response body excerpt kept in a status error.
const BODY_EXCERPT_CHARS: usize = 500;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error connecting to {url}: {reason}")]
    Unreachable { url: String, reason: String },

    #[error("Request to {url} timed out after {}s", .timeout.as_secs())]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP error {status} from {url}: {body}")]
    Status { url: String, status: u16, body: String },

    #[error("Failed to decode JSON response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Thin wrapper over a shared `reqwest::Client`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("toolwire/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    /// GET `url` with query parameters.
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        bearer: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let request = self.client.get(url).query(query);
        self.execute(request, url, bearer, timeout).await
    }

    /// POST a JSON body to `url`.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        bearer: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let request = self.client.post(url).json(body);
        self.execute(request, url, bearer, timeout).await
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        url: &str,
        bearer: Option<&str>,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let request = match bearer {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        log::debug!("HTTP request to {url} (timeout: {timeout:?})");

        let response = request
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify(e, url, timeout))?;

        if !status.is_success() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: excerpt(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

fn classify(error: reqwest::Error, url: &str, timeout: Duration) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
            timeout,
        }
    } else {
        TransportError::Unreachable {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Single-line prefix of a response body.
fn excerpt(body: &str) -> String {
    let flattened = body.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= BODY_EXCERPT_CHARS {
        return flattened;
    }
    let mut cut: String = flattened.chars().take(BODY_EXCERPT_CHARS).collect();
    cut.push_str("...");
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_is_single_line() {
        assert_eq!(excerpt("line one\n  line two\n"), "line one line two");
    }

    #[test]
    fn excerpt_truncates_long_bodies() {
        let long = "x".repeat(BODY_EXCERPT_CHARS + 10);
        let cut = excerpt(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), BODY_EXCERPT_CHARS + 3);
    }

    #[test]
    fn timeout_message_mentions_seconds() {
        let err = TransportError::Timeout {
            url: "http://h/x".into(),
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.to_string(), "Request to http://h/x timed out after 10s");
    }

    #[tokio::test]
    async fn unreachable_host_is_reported() {
        let transport = HttpTransport::new().expect("client builds");
        // Port 9 (discard) on localhost is closed in test environments.
        let err = transport
            .get_json("http://127.0.0.1:9/search", &[], None, Duration::from_secs(2))
            .await
            .expect_err("connection must fail");
        assert!(matches!(err, TransportError::Unreachable { .. } | TransportError::Timeout { .. }));
        assert!(err.to_string().contains("http://127.0.0.1:9/search"));
    }
}
