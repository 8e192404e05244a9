//! Token handling: the `Authorization` header, credential sources, and
//! minting a new token with username and password.

use crate::config::GitHubConfig;
use crate::errors::{GitHubError, GitHubErrorKind, GitHubResult};
use crate::request::decode_error;
use crate::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Builds the `Authorization: token <token>` header value.
///
/// Fails with `MissingAuth` when the token is empty, before anything is sent.
pub fn token_header(token: &SecretString) -> GitHubResult<HeaderValue> {
    let token = token.expose_secret();
    if token.trim().is_empty() {
        return Err(GitHubError::missing_auth("no token specified"));
    }

    let mut value = HeaderValue::from_str(&format!("token {}", token)).map_err(|e| {
        GitHubError::new(
            GitHubErrorKind::InvalidConfiguration,
            "Token contains characters not allowed in a header",
        )
        .with_cause(e)
    })?;
    value.set_sensitive(true);
    Ok(value)
}

/// Builds the `Authorization: Basic ...` header value.
pub fn basic_header(username: &str, password: &SecretString) -> GitHubResult<HeaderValue> {
    let raw = format!("{}:{}", username, password.expose_secret());
    let mut value = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(raw)))
        .map_err(|e| GitHubError::invalid_parameter("Invalid basic credentials").with_cause(e))?;
    value.set_sensitive(true);
    Ok(value)
}

/// Credential provider trait for resolving a token at startup.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Resolves the token.
    async fn token(&self) -> GitHubResult<SecretString>;
}

/// Static credential provider using a fixed token.
pub struct StaticCredentialProvider {
    token: SecretString,
}

impl StaticCredentialProvider {
    /// Creates a new static credential provider.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::new(token.into()),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticCredentialProvider {
    async fn token(&self) -> GitHubResult<SecretString> {
        Ok(self.token.clone())
    }
}

/// Environment variable credential provider.
pub struct EnvCredentialProvider {
    token_var: String,
}

impl EnvCredentialProvider {
    /// Creates a provider from GITHUB_TOKEN environment variable.
    pub fn from_github_token() -> Self {
        Self {
            token_var: "GITHUB_TOKEN".to_string(),
        }
    }

    /// Creates a provider from a custom environment variable.
    pub fn from_env_var(var_name: impl Into<String>) -> Self {
        Self {
            token_var: var_name.into(),
        }
    }
}

#[async_trait]
impl CredentialProvider for EnvCredentialProvider {
    async fn token(&self) -> GitHubResult<SecretString> {
        match std::env::var(&self.token_var) {
            Ok(value) if !value.trim().is_empty() => {
                Ok(SecretString::new(value.trim().to_string()))
            }
            _ => Err(GitHubError::missing_auth(format!(
                "Environment variable {} not set",
                self.token_var
            ))),
        }
    }
}

/// Reads `github.token` from the local git configuration.
pub struct GitConfigCredentialProvider {
    key: String,
}

impl GitConfigCredentialProvider {
    /// Creates a provider for the `github.token` key.
    pub fn new() -> Self {
        Self::with_key("github.token")
    }

    /// Creates a provider for another git config key.
    pub fn with_key(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Default for GitConfigCredentialProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for GitConfigCredentialProvider {
    async fn token(&self) -> GitHubResult<SecretString> {
        let output = tokio::process::Command::new("git")
            .args(["config", "--get", &self.key])
            .output()
            .await
            .map_err(|e| {
                GitHubError::missing_auth(format!("Failed to run git config: {}", e)).with_cause(e)
            })?;

        parse_git_config_output(&self.key, output.status.success(), &output.stdout)
    }
}

fn parse_git_config_output(key: &str, success: bool, stdout: &[u8]) -> GitHubResult<SecretString> {
    let value = String::from_utf8_lossy(stdout);
    let value = value.trim();
    if !success || value.is_empty() {
        return Err(GitHubError::missing_auth(format!(
            "git config has no value for {}",
            key
        )));
    }
    Ok(SecretString::new(value.to_string()))
}

/// Body of a token creation request.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest {
    /// Human-readable note shown in the account's token list.
    pub note: String,
    /// URL associated with the note.
    pub note_url: String,
    /// Requested scopes.
    pub scopes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: Option<String>,
}

/// Mints a new token with one basic-auth `POST <base>authorizations`.
pub async fn create_token(
    config: &GitHubConfig,
    transport: &dyn HttpTransport,
    username: &str,
    password: &SecretString,
    request: &TokenRequest,
) -> GitHubResult<SecretString> {
    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, basic_header(username, password)?);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    let body = serde_json::to_vec(request).map_err(|e| {
        GitHubError::invalid_parameter(format!("Failed to serialize request body: {}", e))
    })?;

    let response = transport
        .send(HttpRequest {
            method: Method::POST,
            url: format!("{}authorizations", config.base_url),
            headers,
            body: Some(body),
        })
        .await?;

    if !response.status.is_success() {
        return Err(decode_error(&response));
    }

    let parsed: TokenResponse = serde_json::from_slice(&response.body).map_err(|e| {
        GitHubError::invalid_json(format!("Failed to parse authorization response: {}", e))
    })?;

    parsed
        .token
        .map(SecretString::new)
        .ok_or_else(|| GitHubError::unexpected_format("authorization response has no token"))
}
