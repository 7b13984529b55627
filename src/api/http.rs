//! HTTP utilities for Strato REST API calls

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging.
/// Truncates long responses and strips non-printable characters.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for Strato API calls.
///
/// Every method sends a bearer token, checks the HTTP status, logs a
/// sanitized error body on failure and parses the response as JSON.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("stratoqa/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    async fn execute(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.context("Failed to send request")?;
        let status = response.status();
        let response_body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        // Handle empty response
        if response_body.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).context("Failed to parse response JSON")
    }

    /// Make a GET request
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        self.execute(Method::GET, url, token, None).await
    }

    /// Make a POST request
    pub async fn post(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        self.execute(Method::POST, url, token, body).await
    }

    /// Make a PUT request
    pub async fn put(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        self.execute(Method::PUT, url, token, body).await
    }

    /// Make a PATCH request
    pub async fn patch(&self, url: &str, token: &str, body: Option<&Value>) -> Result<Value> {
        self.execute(Method::PATCH, url, token, body).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, url: &str, token: &str) -> Result<Value> {
        self.execute(Method::DELETE, url, token, None).await
    }

    /// Make a POST request and hand back the raw response.
    ///
    /// Keystone returns the issued token in a response header rather than
    /// the body, so token issuance needs more than the JSON body.
    pub async fn post_raw(&self, url: &str, body: &Value) -> Result<Response> {
        tracing::debug!("POST {}", url);

        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new().expect("Failed to create default HTTP client")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(MAX_LOG_BODY_LENGTH + 50);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn sanitize_strips_control_characters() {
        let sanitized = sanitize_for_log("token\x1b[31m leaked\n");
        assert_eq!(sanitized, "token[31m leaked");
    }
}
