//! Configuration types for the GitHub client.

use crate::errors::{GitHubError, GitHubErrorKind};
use crate::pagination::PageStrategy;
use crate::rate_limit::DEFAULT_WARNING_THRESHOLD;
use secrecy::SecretString;
use std::time::Duration;

/// Default GitHub API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com/";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default User-Agent header.
pub const DEFAULT_USER_AGENT: &str = concat!("integrations-github-rest/", env!("CARGO_PKG_VERSION"));

/// GitHub client configuration.
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL, always ending in `/`.
    pub base_url: String,
    /// Access token. May be empty here; requests fail before sending if it is.
    pub token: SecretString,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User-Agent header.
    pub user_agent: String,
    /// Remaining-request count below which one warning is logged.
    pub rate_limit_warning_threshold: u32,
    /// How the full-drain walker picks the next page.
    pub page_strategy: PageStrategy,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: SecretString::new(String::new()),
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rate_limit_warning_threshold: DEFAULT_WARNING_THRESHOLD,
            page_strategy: PageStrategy::default(),
        }
    }
}

impl GitHubConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> GitHubConfigBuilder {
        GitHubConfigBuilder::new()
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), GitHubError> {
        if self.base_url.is_empty() {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL cannot be empty",
            ));
        }

        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                format!("Base URL is not a valid URL: {}", e),
            )
            .with_cause(e)
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL must start with http:// or https://",
            ));
        }

        if parsed.query().is_some() {
            return Err(GitHubError::new(
                GitHubErrorKind::InvalidBaseUrl,
                "Base URL must not carry a query string",
            ));
        }

        if self.user_agent.is_empty() {
            return Err(GitHubError::configuration("User-Agent is required by GitHub API"));
        }

        if self.timeout.is_zero() {
            return Err(GitHubError::configuration("Timeout must be non-zero"));
        }

        Ok(())
    }
}

/// Appends the trailing slash that path joining relies on.
fn normalize_base_url(url: String) -> String {
    if url.is_empty() || url.ends_with('/') {
        url
    } else {
        format!("{}/", url)
    }
}

/// Builder for GitHubConfig.
#[derive(Debug, Default)]
pub struct GitHubConfigBuilder {
    base_url: Option<String>,
    token: Option<SecretString>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    rate_limit_warning_threshold: Option<u32>,
    page_strategy: Option<PageStrategy>,
}

impl GitHubConfigBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the access token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(SecretString::new(token.into()));
        self
    }

    /// Sets an access token that is already wrapped.
    pub fn secret_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent header.
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the low rate-limit warning threshold.
    pub fn rate_limit_warning_threshold(mut self, threshold: u32) -> Self {
        self.rate_limit_warning_threshold = Some(threshold);
        self
    }

    /// Sets the pagination strategy.
    pub fn page_strategy(mut self, strategy: PageStrategy) -> Self {
        self.page_strategy = Some(strategy);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> Result<GitHubConfig, GitHubError> {
        let config = GitHubConfig {
            base_url: normalize_base_url(
                self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            ),
            token: self.token.unwrap_or_else(|| SecretString::new(String::new())),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent: self.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
            rate_limit_warning_threshold: self
                .rate_limit_warning_threshold
                .unwrap_or(DEFAULT_WARNING_THRESHOLD),
            page_strategy: self.page_strategy.unwrap_or_default(),
        };

        config.validate()?;
        Ok(config)
    }
}
