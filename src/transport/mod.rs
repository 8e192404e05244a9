//! HTTP transport: one request in, one response out.

use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{redirect, Client, Method, StatusCode};

/// A fully built outbound request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Serialized body.
    pub body: Option<Vec<u8>>,
}

/// A raw response: status, header multimap, body bytes.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body bytes, possibly empty.
    pub body: Bytes,
}

/// Sends a single HTTP request.
///
/// Implementations must not retry and must not follow redirects; a 3xx
/// response is returned like any other response.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends the request and returns whatever response arrives.
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse>;
}

/// Transport backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
}

impl ReqwestTransport {
    /// Builds the underlying client from the configuration.
    pub fn new(config: &GitHubConfig) -> GitHubResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .redirect(redirect::Policy::none())
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| {
                GitHubError::new(
                    GitHubErrorKind::InvalidConfiguration,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { http })
    }

    fn map_send_error(error: reqwest::Error) -> GitHubError {
        if error.is_timeout() {
            GitHubError::timeout(format!("Request timed out: {}", error)).with_cause(error)
        } else if error.is_connect() {
            GitHubError::new(
                GitHubErrorKind::ConnectionFailed,
                format!("Connection failed: {}", error),
            )
            .with_cause(error)
        } else {
            GitHubError::new(
                GitHubErrorKind::RequestFailed,
                format!("Request failed: {}", error),
            )
            .with_cause(error)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> GitHubResult<HttpResponse> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(Self::map_send_error)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(Self::map_send_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
