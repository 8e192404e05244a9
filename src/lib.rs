//! # GitHub REST Client
//!
//! An async GitHub REST client with:
//! - One request engine that authenticates, decodes and tracks rate limits
//! - Link-header pagination and a bounded walker for the events feed
//! - Façades for hooks, statuses, pull requests, comments and gists
//! - Token minting and the `create-token` / `gist` command-line tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use integrations_github_rest::GitHubClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GitHubClient::builder()
//!         .token("ghp_xxxxxxxxxxxx")
//!         .build()?;
//!
//!     for hook in client.repos().hooks("octocat", "hello-world").await? {
//!         println!("{}", hook["config"]["url"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency
//!
//! A client may be shared across tasks. Each paginated walk requests its
//! pages strictly one after another and decides whether to continue from
//! the response it just received, so concurrent walks do not interfere.
//! [`GitHubClient::last_response_headers`] is a last-writer-wins snapshot
//! and is only meaningful when requests are not overlapping.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Core modules
pub mod config;
pub mod errors;

// Authentication
pub mod auth;

// HTTP client and transport
pub mod client;
pub mod request;
pub mod transport;

// Pagination handling
pub mod pagination;

// Rate limit tracking
pub mod rate_limit;

// API Services
pub mod services;

// Observability
pub mod observability;

// Mocks for testing
pub mod mocks;

// Command-line tools
pub mod cli;

// Re-exports for convenience
pub use auth::{
    create_token, CredentialProvider, EnvCredentialProvider, GitConfigCredentialProvider,
    TokenRequest,
};
pub use client::{GitHubClient, GitHubClientBuilder, RequestEngine};
pub use config::{GitHubConfig, GitHubConfigBuilder};
pub use errors::{ErrorCategory, GitHubError, GitHubErrorKind, GitHubResult};
pub use pagination::{LinkDirective, PageStrategy, PaginationLinks};
pub use request::{ApiRequest, ApiResponse};
pub use services::*;
pub use transport::{HttpTransport, ReqwestTransport};
