//! Mints a GitHub OAuth token from a username and password.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use integrations_github_rest::cli::parse_or_exit;
use integrations_github_rest::config::DEFAULT_BASE_URL;
use integrations_github_rest::observability::{init_logging, LogFormat, LogLevel, LoggingConfig};
use integrations_github_rest::{create_token, GitHubConfig, ReqwestTransport, TokenRequest};
use secrecy::{ExposeSecret, SecretString};

#[derive(Debug, Parser)]
#[command(name = "create-token")]
#[command(version, about = "Create a new GitHub OAuth token", long_about = None)]
struct Cli {
    /// Token note
    #[arg(short, long, default_value = "integrations-github-rest")]
    note: String,

    /// Token note URL
    #[arg(short, long, default_value = "https://github.com/integrations/github-rest")]
    url: String,

    /// Scope to request (repeatable)
    #[arg(short, long = "scope")]
    scopes: Vec<String>,

    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: pretty, json or compact
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// GitHub username
    username: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli: Cli = parse_or_exit();

    let level = if cli.verbose { LogLevel::Debug } else { LogLevel::Warn };
    init_logging(
        &LoggingConfig::new()
            .with_level(level)
            .with_format(cli.log_format),
    )
    .map_err(|e| anyhow!(e))?;

    let password = rpassword::prompt_password("github password: ")
        .context("failed to read password")?;

    let config = GitHubConfig::builder().base_url(&cli.base_url).build()?;
    let transport = ReqwestTransport::new(&config)?;

    let token = create_token(
        &config,
        &transport,
        &cli.username,
        &SecretString::new(password),
        &TokenRequest {
            note: cli.note,
            note_url: cli.url,
            scopes: cli.scopes,
        },
    )
    .await?;

    println!("{}", token.expose_secret());
    Ok(())
}
