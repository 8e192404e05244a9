//! Error types for the GitHub REST client.

use crate::rate_limit::RateLimitInfo;
use std::fmt;
use thiserror::Error;

/// Result type alias for GitHub operations.
pub type GitHubResult<T> = Result<T, GitHubError>;

/// Broad failure classes a caller can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad or missing client configuration; no request was sent.
    Configuration,
    /// The request never produced an HTTP response.
    Transport,
    /// A response arrived but could not be understood.
    Protocol,
    /// The caller broke an operation's contract; no request was sent.
    Validation,
    /// The service answered with a non-success status.
    RemoteApi,
}

/// Error kinds for categorizing GitHub errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubErrorKind {
    // Configuration errors
    /// Missing or empty access token.
    MissingAuth,
    /// Invalid base URL.
    InvalidBaseUrl,
    /// Invalid configuration.
    InvalidConfiguration,

    // Transport errors
    /// Connection failed.
    ConnectionFailed,
    /// Request timeout.
    Timeout,
    /// Any other failure while sending the request or reading the body.
    RequestFailed,

    // Protocol errors
    /// Response body was not valid JSON.
    InvalidJson,
    /// Link header could not be parsed.
    MalformedLinkHeader,
    /// JSON had an unexpected shape.
    UnexpectedFormat,

    // Validation errors
    /// Caller-side contract violation.
    ValidationError,
    /// Invalid parameter.
    InvalidParameter,

    // Remote API errors
    /// A 3xx response; redirects are never followed.
    Redirect,
    /// Bad request (400).
    BadRequest,
    /// Bad credentials (401).
    BadCredentials,
    /// Access forbidden (403).
    Forbidden,
    /// Resource not found (404).
    NotFound,
    /// Resource conflict (409).
    Conflict,
    /// Resource is gone (410).
    Gone,
    /// Unprocessable entity (422).
    UnprocessableEntity,
    /// Rate limit exceeded (429, or 403 with no requests remaining).
    RateLimitExceeded,
    /// Server error (5xx).
    ServerError,
    /// Any other non-success status.
    UnexpectedStatus,
}

impl GitHubErrorKind {
    /// Returns the taxonomy bucket this kind belongs to.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingAuth | Self::InvalidBaseUrl | Self::InvalidConfiguration => {
                ErrorCategory::Configuration
            }
            Self::ConnectionFailed | Self::Timeout | Self::RequestFailed => {
                ErrorCategory::Transport
            }
            Self::InvalidJson | Self::MalformedLinkHeader | Self::UnexpectedFormat => {
                ErrorCategory::Protocol
            }
            Self::ValidationError | Self::InvalidParameter => ErrorCategory::Validation,
            Self::Redirect
            | Self::BadRequest
            | Self::BadCredentials
            | Self::Forbidden
            | Self::NotFound
            | Self::Conflict
            | Self::Gone
            | Self::UnprocessableEntity
            | Self::RateLimitExceeded
            | Self::ServerError
            | Self::UnexpectedStatus => ErrorCategory::RemoteApi,
        }
    }
}

impl fmt::Display for GitHubErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAuth => write!(f, "missing_auth"),
            Self::InvalidBaseUrl => write!(f, "invalid_base_url"),
            Self::InvalidConfiguration => write!(f, "invalid_configuration"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::RequestFailed => write!(f, "request_failed"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::MalformedLinkHeader => write!(f, "malformed_link_header"),
            Self::UnexpectedFormat => write!(f, "unexpected_format"),
            Self::ValidationError => write!(f, "validation_error"),
            Self::InvalidParameter => write!(f, "invalid_parameter"),
            Self::Redirect => write!(f, "redirect"),
            Self::BadRequest => write!(f, "bad_request"),
            Self::BadCredentials => write!(f, "bad_credentials"),
            Self::Forbidden => write!(f, "forbidden"),
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Gone => write!(f, "gone"),
            Self::UnprocessableEntity => write!(f, "unprocessable_entity"),
            Self::RateLimitExceeded => write!(f, "rate_limit_exceeded"),
            Self::ServerError => write!(f, "server_error"),
            Self::UnexpectedStatus => write!(f, "unexpected_status"),
        }
    }
}

/// GitHub API error with detailed information.
#[derive(Error, Debug)]
pub struct GitHubError {
    /// Error kind.
    kind: GitHubErrorKind,
    /// Error message.
    message: String,
    /// HTTP status code.
    status_code: Option<u16>,
    /// GitHub request ID.
    request_id: Option<String>,
    /// Documentation URL.
    documentation_url: Option<String>,
    /// Raw response body, kept for remote errors.
    body: Option<String>,
    /// `Location` header of a redirect response.
    location: Option<String>,
    /// Rate limit info (if applicable).
    rate_limit: Option<RateLimitInfo>,
    /// Underlying cause.
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for GitHubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        if let Some(code) = self.status_code {
            write!(f, " (HTTP {})", code)?;
        }
        if let Some(ref id) = self.request_id {
            write!(f, " [request_id: {}]", id)?;
        }
        Ok(())
    }
}

impl GitHubError {
    /// Creates a new GitHub error.
    pub fn new(kind: GitHubErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status_code: None,
            request_id: None,
            documentation_url: None,
            body: None,
            location: None,
            rate_limit: None,
            cause: None,
        }
    }

    /// Sets the HTTP status code.
    pub fn with_status(mut self, code: u16) -> Self {
        self.status_code = Some(code);
        self
    }

    /// Sets the GitHub request ID.
    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Sets the documentation URL.
    pub fn with_documentation_url(mut self, url: impl Into<String>) -> Self {
        self.documentation_url = Some(url.into());
        self
    }

    /// Keeps the raw response body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the redirect target.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Sets the rate limit info.
    pub fn with_rate_limit(mut self, info: RateLimitInfo) -> Self {
        self.rate_limit = Some(info);
        self
    }

    /// Sets the underlying cause.
    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// Gets the error kind.
    pub fn kind(&self) -> &GitHubErrorKind {
        &self.kind
    }

    /// Gets the taxonomy bucket.
    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    /// Gets the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Gets the HTTP status code.
    pub fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// Gets the request ID.
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Gets the documentation URL.
    pub fn documentation_url(&self) -> Option<&str> {
        self.documentation_url.as_deref()
    }

    /// Gets the raw response body of a remote error.
    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Gets the `Location` of a redirect response.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Gets the rate limit info.
    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    /// Creates an error from a non-success HTTP status.
    pub fn from_response(
        status: u16,
        message: String,
        documentation_url: Option<String>,
        request_id: Option<String>,
    ) -> Self {
        let kind = Self::kind_from_status(status);
        let mut error = Self::new(kind, message).with_status(status);

        if let Some(url) = documentation_url {
            error = error.with_documentation_url(url);
        }
        if let Some(id) = request_id {
            error = error.with_request_id(id);
        }

        error
    }

    /// Maps HTTP status code to error kind.
    fn kind_from_status(status: u16) -> GitHubErrorKind {
        match status {
            300..=399 => GitHubErrorKind::Redirect,
            400 => GitHubErrorKind::BadRequest,
            401 => GitHubErrorKind::BadCredentials,
            403 => GitHubErrorKind::Forbidden,
            404 => GitHubErrorKind::NotFound,
            409 => GitHubErrorKind::Conflict,
            410 => GitHubErrorKind::Gone,
            422 => GitHubErrorKind::UnprocessableEntity,
            429 => GitHubErrorKind::RateLimitExceeded,
            500..=599 => GitHubErrorKind::ServerError,
            _ => GitHubErrorKind::UnexpectedStatus,
        }
    }

    // Convenience constructors

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidConfiguration, message)
    }

    /// Creates a missing-token error.
    pub fn missing_auth(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::MissingAuth, message)
    }

    /// Creates a caller-side validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::ValidationError, message)
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidParameter, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::Timeout, message)
    }

    /// Creates an invalid JSON error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::InvalidJson, message)
    }

    /// Creates a malformed Link header error.
    pub fn malformed_link(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::MalformedLinkHeader, message)
    }

    /// Creates an unexpected format error.
    pub fn unexpected_format(message: impl Into<String>) -> Self {
        Self::new(GitHubErrorKind::UnexpectedFormat, message)
    }
}
