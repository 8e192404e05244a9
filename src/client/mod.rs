//! GitHub API client and the request engine behind it.

use crate::auth::token_header;
use crate::config::{GitHubConfig, GitHubConfigBuilder};
use crate::errors::{GitHubError, GitHubResult};
use crate::observability::TracingHooks;
use crate::pagination::PageStrategy;
use crate::rate_limit::RateLimitMonitor;
use crate::request::{ApiRequest, ApiResponse};
use crate::services::*;
use crate::transport::{HttpRequest, HttpTransport, ReqwestTransport};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use secrecy::SecretString;
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Issues authenticated requests and decodes their responses.
///
/// The token and base URL never change after construction. The
/// last-response-headers snapshot and the rate-limit warning flag are the
/// only mutable state; both are last-writer-wins across concurrent
/// requests. Pagination does not depend on either.
pub struct RequestEngine {
    config: GitHubConfig,
    transport: Arc<dyn HttpTransport>,
    rate_limit: RateLimitMonitor,
    last_response_headers: Mutex<Option<HeaderMap>>,
}

impl RequestEngine {
    /// Creates an engine over the given transport.
    pub fn new(config: GitHubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let rate_limit = RateLimitMonitor::new(config.rate_limit_warning_threshold);
        Self {
            config,
            transport,
            rate_limit,
            last_response_headers: Mutex::new(None),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// Sends one request and returns the decoded envelope.
    ///
    /// Fails before any I/O when the path is empty or the token is empty.
    /// Exactly one HTTP request is made; nothing is retried.
    pub async fn send(&self, request: &ApiRequest) -> GitHubResult<ApiResponse> {
        if request.is_empty_path() {
            return Err(GitHubError::invalid_parameter(
                "request needs at least one path segment",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token_header(&self.config.token)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let body = request.body_bytes()?;
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let url = request.url(&self.config.base_url);
        let method = request.method().clone();
        TracingHooks::on_request_start(method.as_str(), &url);

        let started = Instant::now();
        let raw = self
            .transport
            .send(HttpRequest {
                method: method.clone(),
                url: url.clone(),
                headers,
                body,
            })
            .await
            .map_err(|e| {
                TracingHooks::on_request_error(method.as_str(), &url, &e.to_string());
                e
            })?;
        TracingHooks::on_request_complete(
            method.as_str(),
            &url,
            raw.status.as_u16(),
            started.elapsed(),
        );

        self.rate_limit.observe(&raw.headers);
        *self
            .last_response_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(raw.headers.clone());

        ApiResponse::from_http(raw).map_err(|e| {
            TracingHooks::on_request_error(method.as_str(), &url, &e.to_string());
            e
        })
    }

    /// Sends one request and returns only the decoded body.
    pub async fn request(&self, request: &ApiRequest) -> GitHubResult<Option<Value>> {
        Ok(self.send(request).await?.into_body())
    }

    /// Headers of whichever response completed most recently.
    pub fn last_response_headers(&self) -> Option<HeaderMap> {
        self.last_response_headers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns true once the low rate-limit warning has been logged.
    pub fn rate_limit_warning_issued(&self) -> bool {
        self.rate_limit.warning_issued()
    }
}

/// GitHub API client.
///
/// Owns one request engine and one instance of each endpoint façade, all
/// built up front.
pub struct GitHubClient {
    engine: Arc<RequestEngine>,
    repos: RepositoriesService,
    pulls: PullRequestsService,
    comments: IssueCommentsService,
    reviews: ReviewCommentsService,
    gists: GistsService,
}

impl GitHubClient {
    /// Creates a new GitHub client using the reqwest transport.
    pub fn new(config: GitHubConfig) -> GitHubResult<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client over an arbitrary transport.
    pub fn with_transport(config: GitHubConfig, transport: Arc<dyn HttpTransport>) -> Self {
        let engine = Arc::new(RequestEngine::new(config, transport));
        Self {
            repos: RepositoriesService::new(engine.clone()),
            pulls: PullRequestsService::new(engine.clone()),
            comments: IssueCommentsService::new(engine.clone()),
            reviews: ReviewCommentsService::new(engine.clone()),
            gists: GistsService::new(engine.clone()),
            engine,
        }
    }

    /// Creates a new client builder.
    pub fn builder() -> GitHubClientBuilder {
        GitHubClientBuilder::new()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.engine.config().base_url
    }

    /// Gets the request engine.
    pub fn engine(&self) -> &RequestEngine {
        &self.engine
    }

    // Service accessors

    /// Gets the repositories service.
    pub fn repos(&self) -> &RepositoriesService {
        &self.repos
    }

    /// Gets the pull requests service.
    pub fn pulls(&self) -> &PullRequestsService {
        &self.pulls
    }

    /// Gets the issue comments service.
    pub fn comments(&self) -> &IssueCommentsService {
        &self.comments
    }

    /// Gets the review comments service.
    pub fn reviews(&self) -> &ReviewCommentsService {
        &self.reviews
    }

    /// Gets the gists service.
    pub fn gists(&self) -> &GistsService {
        &self.gists
    }

    // Engine shortcuts

    /// Sends one request and returns the decoded envelope.
    pub async fn send(&self, request: &ApiRequest) -> GitHubResult<ApiResponse> {
        self.engine.send(request).await
    }

    /// Sends one request and returns only the decoded body.
    pub async fn request(&self, request: &ApiRequest) -> GitHubResult<Option<Value>> {
        self.engine.request(request).await
    }

    /// Fetches and concatenates every page of a collection.
    pub async fn request_all_pages<I, S>(&self, segments: I) -> GitHubResult<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.engine.request_all_pages(segments).await
    }

    /// Headers of whichever response completed most recently.
    pub fn last_response_headers(&self) -> Option<HeaderMap> {
        self.engine.last_response_headers()
    }

    /// Returns true once the low rate-limit warning has been logged.
    pub fn rate_limit_warning_issued(&self) -> bool {
        self.engine.rate_limit_warning_issued()
    }
}

/// Builder for GitHubClient.
pub struct GitHubClientBuilder {
    config_builder: GitHubConfigBuilder,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl GitHubClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self {
            config_builder: GitHubConfig::builder(),
            transport: None,
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(url);
        self
    }

    /// Sets the access token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.token(token);
        self
    }

    /// Sets the access token from an already-secret value.
    pub fn secret_token(mut self, token: SecretString) -> Self {
        self.config_builder = self.config_builder.secret_token(token);
        self
    }

    /// Sets the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the User-Agent.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.user_agent(ua);
        self
    }

    /// Sets the pagination strategy.
    pub fn page_strategy(mut self, strategy: PageStrategy) -> Self {
        self.config_builder = self.config_builder.page_strategy(strategy);
        self
    }

    /// Uses a custom transport instead of reqwest.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the client.
    pub fn build(self) -> GitHubResult<GitHubClient> {
        let config = self.config_builder.build()?;
        match self.transport {
            Some(transport) => Ok(GitHubClient::with_transport(config, transport)),
            None => GitHubClient::new(config),
        }
    }
}

impl Default for GitHubClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
