//! Request descriptors and decoded response envelopes.

use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::pagination::PaginationLinks;
use crate::rate_limit::RateLimitInfo;
use crate::transport::HttpResponse;
use reqwest::header::{HeaderMap, LOCATION};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Where a request goes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    /// Path segments joined with `/` after the base URL.
    Segments(Vec<String>),
    /// A full URL taken from a `rel="next"` link.
    Absolute(String),
}

/// Describes exactly one HTTP request attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    target: Target,
    method: Method,
    page: u32,
    payload: Option<Value>,
}

impl ApiRequest {
    /// Creates a request for the given method and path segments.
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            target: Target::Segments(segments.into_iter().map(Into::into).collect()),
            method,
            page: 0,
            payload: None,
        }
    }

    /// Creates a GET request.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, segments)
    }

    /// Creates a POST request.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    /// Creates a PATCH request.
    pub fn patch<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PATCH, segments)
    }

    /// Creates a DELETE request.
    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Creates a GET for a URL advertised by a Link header.
    pub(crate) fn absolute(url: impl Into<String>) -> Self {
        Self {
            target: Target::Absolute(url.into()),
            method: Method::GET,
            page: 0,
            payload: None,
        }
    }

    /// Selects a page; zero means no `page` parameter.
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Attaches a JSON body.
    pub fn with_json<T: Serialize + ?Sized>(mut self, payload: &T) -> GitHubResult<Self> {
        let value = serde_json::to_value(payload).map_err(|e| {
            GitHubError::invalid_parameter(format!("Failed to serialize request body: {}", e))
        })?;
        self.payload = Some(value);
        Ok(self)
    }

    /// Gets the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Gets the page cursor.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Gets the JSON body, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Gets the path segments; empty for absolute requests.
    pub fn segments(&self) -> &[String] {
        match &self.target {
            Target::Segments(segments) => segments,
            Target::Absolute(_) => &[],
        }
    }

    /// Returns true when the request has nowhere to go.
    pub(crate) fn is_empty_path(&self) -> bool {
        matches!(&self.target, Target::Segments(segments) if segments.is_empty())
    }

    /// Builds the full URL: `base_url + segments.join("/")`, then `?page=N`.
    pub fn url(&self, base_url: &str) -> String {
        let mut url = match &self.target {
            Target::Segments(segments) => format!("{}{}", base_url, segments.join("/")),
            Target::Absolute(url) => return url.clone(),
        };
        if self.page != 0 {
            url.push_str(&format!("?page={}", self.page));
        }
        url
    }

    /// Serializes the body for the wire.
    pub(crate) fn body_bytes(&self) -> GitHubResult<Option<Vec<u8>>> {
        self.payload
            .as_ref()
            .map(serde_json::to_vec)
            .transpose()
            .map_err(|e| {
                GitHubError::invalid_parameter(format!("Failed to serialize request body: {}", e))
            })
    }
}

/// A successful response: status, headers, and the decoded body.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Status code (always 2xx).
    pub status: StatusCode,
    /// Response header multimap.
    pub headers: HeaderMap,
    /// Decoded body; `None` for 204 or an empty body.
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Decodes a raw response.
    ///
    /// Non-2xx statuses become remote errors. 204 and empty bodies decode
    /// to `None`; anything else must be JSON.
    pub fn from_http(response: HttpResponse) -> GitHubResult<Self> {
        if !response.status.is_success() {
            return Err(decode_error(&response));
        }

        let body = if response.status == StatusCode::NO_CONTENT
            || response.body.iter().all(u8::is_ascii_whitespace)
        {
            None
        } else {
            Some(serde_json::from_slice(&response.body).map_err(|e| {
                GitHubError::invalid_json(format!("Failed to decode response body: {}", e))
                    .with_status(response.status.as_u16())
                    .with_body(String::from_utf8_lossy(&response.body))
            })?)
        };

        Ok(Self {
            status: response.status,
            headers: response.headers,
            body,
        })
    }

    /// Borrows the decoded body.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Takes the decoded body.
    pub fn into_body(self) -> Option<Value> {
        self.body
    }

    /// Parses the `Link` header.
    pub fn links(&self) -> GitHubResult<PaginationLinks> {
        PaginationLinks::from_headers(&self.headers)
    }

    /// Reads rate limit headers.
    pub fn rate_limit(&self) -> Option<RateLimitInfo> {
        RateLimitInfo::from_headers(&self.headers)
    }

    /// Treats the body as one page of items.
    ///
    /// An empty body is an empty page; a body that is not an array is a
    /// protocol error.
    pub fn into_items(self) -> GitHubResult<Vec<Value>> {
        match self.body {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(other) => Err(GitHubError::unexpected_format(format!(
                "Expected a JSON array page, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// GitHub error response format.
#[derive(Debug, Deserialize)]
struct GitHubErrorResponse {
    message: Option<String>,
    documentation_url: Option<String>,
}

/// Turns a non-success response into a remote error, keeping the body.
pub(crate) fn decode_error(response: &HttpResponse) -> GitHubError {
    let status = response.status;
    let raw_body = String::from_utf8_lossy(&response.body).into_owned();
    let parsed = serde_json::from_slice::<GitHubErrorResponse>(&response.body).ok();

    let message = parsed
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("HTTP {} error", status.as_u16()));
    let documentation_url = parsed.and_then(|e| e.documentation_url);
    let request_id = response
        .headers
        .get("x-github-request-id")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    let rate_limit = RateLimitInfo::from_headers(&response.headers);

    let mut error = if status == StatusCode::FORBIDDEN
        && rate_limit.as_ref().map(|r| r.remaining) == Some(0)
    {
        let mut error = GitHubError::new(GitHubErrorKind::RateLimitExceeded, message)
            .with_status(status.as_u16());
        if let Some(url) = documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }
        error
    } else {
        GitHubError::from_response(status.as_u16(), message, documentation_url, request_id)
    };

    if status.is_redirection() {
        if let Some(location) = response.headers.get(LOCATION).and_then(|v| v.to_str().ok()) {
            error = error.with_location(location);
        }
    }
    if let Some(info) = rate_limit {
        error = error.with_rate_limit(info);
    }
    if !raw_body.is_empty() {
        error = error.with_body(raw_body);
    }

    error
}
