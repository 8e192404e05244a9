//! Scripted transport for testing code built on the client.

use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::StatusCode;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, PoisonError};

/// A mock response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Status code.
    pub status: u16,
    /// Response body.
    pub body: String,
    /// Headers, in order; names may repeat.
    pub headers: Vec<(String, String)>,
}

impl MockResponse {
    /// Creates a response with an arbitrary status and body.
    pub fn raw(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            headers: Vec::new(),
        }
    }

    /// Creates a successful response with the given body.
    pub fn ok<T: Serialize>(body: &T) -> Self {
        Self::raw(200, serde_json::to_string(body).unwrap_or_default())
    }

    /// Creates a 201 Created response.
    pub fn created<T: Serialize>(body: &T) -> Self {
        Self::raw(201, serde_json::to_string(body).unwrap_or_default())
    }

    /// Creates a 204 No Content response.
    pub fn no_content() -> Self {
        Self::raw(204, "")
    }

    /// Creates a 404 Not Found response.
    pub fn not_found(message: &str) -> Self {
        Self::error(404, message)
    }

    /// Creates a 401 Unauthorized response.
    pub fn unauthorized(message: &str) -> Self {
        Self::error(401, message)
    }

    /// Creates a 403 Forbidden response.
    pub fn forbidden(message: &str) -> Self {
        Self::error(403, message)
    }

    /// Creates a 500 Internal Server Error response.
    pub fn server_error(message: &str) -> Self {
        Self::raw(500, serde_json::json!({ "message": message }).to_string())
    }

    /// Creates a redirect to `location`.
    pub fn redirect(status: u16, location: &str) -> Self {
        Self::raw(status, "").with_header("location", location)
    }

    fn error(status: u16, message: &str) -> Self {
        Self::raw(
            status,
            serde_json::json!({
                "message": message,
                "documentation_url": "https://docs.github.com/rest"
            })
            .to_string(),
        )
    }

    /// Adds a header to the response.
    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Adds a Link header advertising a next page.
    pub fn with_next_link(self, url: &str) -> Self {
        self.with_header("link", &format!("<{}>; rel=\"next\"", url))
    }

    /// Adds rate limit headers.
    pub fn with_rate_limit(self, limit: u32, remaining: u32, reset_timestamp: i64) -> Self {
        self.with_header("x-ratelimit-limit", &limit.to_string())
            .with_header("x-ratelimit-remaining", &remaining.to_string())
            .with_header("x-ratelimit-reset", &reset_timestamp.to_string())
    }

    fn into_http(self) -> GitHubResult<HttpResponse> {
        let status = StatusCode::from_u16(self.status).map_err(|e| {
            GitHubError::new(GitHubErrorKind::RequestFailed, "Invalid mock status").with_cause(e)
        })?;
        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                GitHubError::new(GitHubErrorKind::RequestFailed, "Invalid mock header name")
                    .with_cause(e)
            })?;
            let value = HeaderValue::from_str(&value).map_err(|e| {
                GitHubError::new(GitHubErrorKind::RequestFailed, "Invalid mock header value")
                    .with_cause(e)
            })?;
            headers.append(name, value);
        }
        Ok(HttpResponse {
            status,
            headers,
            body: Bytes::from(self.body),
        })
    }
}

/// A recorded mock request.
#[derive(Debug, Clone)]
pub struct MockRequest {
    /// HTTP method.
    pub method: String,
    /// Full URL, including any query.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body.
    pub body: Option<Vec<u8>>,
}

impl MockRequest {
    /// Gets a header value as a string.
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> Option<serde_json::Value> {
        self.body
            .as_deref()
            .and_then(|b| serde_json::from_slice(b).ok())
    }
}

/// Behavior for requests with no registered response.
#[derive(Debug, Clone, Copy, Default)]
pub enum DefaultBehavior {
    /// Answer with 404.
    #[default]
    NotFound,
    /// Fail as if the connection was refused.
    Error,
}

/// Transport that replays registered responses.
///
/// Responses are keyed by `METHOD url` and consumed first-in, first-out.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<MockResponse>>>,
    requests: Mutex<Vec<MockRequest>>,
    default_behavior: DefaultBehavior,
}

impl MockTransport {
    /// Creates a new mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails unmatched requests with a transport error instead of a 404.
    pub fn fail_unmatched(mut self) -> Self {
        self.default_behavior = DefaultBehavior::Error;
        self
    }

    /// Registers a response for a given method and URL.
    pub fn register(&self, method: &str, url: &str, response: MockResponse) {
        let key = format!("{}:{}", method.to_uppercase(), url);
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .push_back(response);
    }

    /// Registers a GET response.
    pub fn on_get(&self, url: &str, response: MockResponse) {
        self.register("GET", url, response);
    }

    /// Registers a POST response.
    pub fn on_post(&self, url: &str, response: MockResponse) {
        self.register("POST", url, response);
    }

    /// Registers a PATCH response.
    pub fn on_patch(&self, url: &str, response: MockResponse) {
        self.register("PATCH", url, response);
    }

    /// Registers a DELETE response.
    pub fn on_delete(&self, url: &str, response: MockResponse) {
        self.register("DELETE", url, response);
    }

    /// Returns every request received so far, in order.
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        let key = format!("{}:{}", request.method.as_str(), request.url);

        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MockRequest {
                method: request.method.to_string(),
                url: request.url.clone(),
                headers: request.headers,
                body: request.body,
            });

        let response = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&key)
            .and_then(VecDeque::pop_front);

        match (response, self.default_behavior) {
            (Some(response), _) => response.into_http(),
            (None, DefaultBehavior::NotFound) => MockResponse::not_found(&format!(
                "No mock response for {} {}",
                request.method, request.url
            ))
            .into_http(),
            (None, DefaultBehavior::Error) => Err(GitHubError::new(
                GitHubErrorKind::ConnectionFailed,
                format!("No mock response for {} {}", request.method, request.url),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;

    fn get(url: &str) -> HttpRequest {
        HttpRequest {
            method: Method::GET,
            url: url.to_string(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    #[tokio::test]
    async fn test_responses_are_consumed_in_order() {
        let transport = MockTransport::new();
        transport.on_get("https://x/a", MockResponse::raw(200, "1"));
        transport.on_get("https://x/a", MockResponse::raw(200, "2"));

        let first = transport.send(get("https://x/a")).await.unwrap();
        let second = transport.send(get("https://x/a")).await.unwrap();
        let third = transport.send(get("https://x/a")).await.unwrap();

        assert_eq!(&first.body[..], b"1");
        assert_eq!(&second.body[..], b"2");
        assert_eq!(third.status, StatusCode::NOT_FOUND);
        assert_eq!(transport.requested_urls().len(), 3);
    }

    #[tokio::test]
    async fn test_repeated_headers_are_kept() {
        let transport = MockTransport::new();
        transport.on_get(
            "https://x/a",
            MockResponse::raw(200, "[]")
                .with_header("link", "<https://x/a?page=1>; rel=\"prev\"")
                .with_next_link("https://x/a?page=3"),
        );

        let response = transport.send(get("https://x/a")).await.unwrap();
        assert_eq!(response.headers.get_all("link").iter().count(), 2);
    }

    #[tokio::test]
    async fn test_fail_unmatched() {
        let transport = MockTransport::new().fail_unmatched();
        let error = transport.send(get("https://x/missing")).await.unwrap_err();
        assert_eq!(error.kind(), &GitHubErrorKind::ConnectionFailed);
    }
}
