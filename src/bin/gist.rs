//! Posts files, or standard input, as a public gist.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use integrations_github_rest::cli::parse_or_exit;
use integrations_github_rest::config::DEFAULT_BASE_URL;
use integrations_github_rest::observability::{init_logging, LogFormat, LogLevel, LoggingConfig};
use integrations_github_rest::{
    CreateGist, CredentialProvider, EnvCredentialProvider, GitConfigCredentialProvider,
    GitHubClient,
};
use secrecy::SecretString;
use std::io::Read;
use std::path::PathBuf;

/// File name used for content read from standard input.
const STDIN_FILE_NAME: &str = "gistfile1";

#[derive(Debug, Parser)]
#[command(name = "gist")]
#[command(version, about = "Post a gist", long_about = None)]
struct Cli {
    /// OAuth token; falls back to $GITHUB_TOKEN, then `git config github.token`
    #[arg(short, long)]
    token: Option<String>,

    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Log requests to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Log output format: pretty, json or compact
    #[arg(long, default_value = "compact")]
    log_format: LogFormat,

    /// Files to post; standard input when none are given
    files: Vec<PathBuf>,
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

    let token = match cli.token {
        Some(token) => SecretString::new(token),
        None => match EnvCredentialProvider::from_github_token().token().await {
            Ok(token) => token,
            Err(_) => GitConfigCredentialProvider::new().token().await?,
        },
    };

    let gist = CreateGist::from_files(read_files(&cli.files)?);

    let client = GitHubClient::builder()
        .base_url(&cli.base_url)
        .secret_token(token)
        .build()?;

    let response = client
        .gists()
        .create(&gist)
        .await?
        .ok_or_else(|| anyhow!("empty response from gist creation"))?;
    let html_url = response["html_url"]
        .as_str()
        .ok_or_else(|| anyhow!("gist response has no html_url"))?;

    println!("{}", html_url);
    Ok(())
}

fn read_files(paths: &[PathBuf]) -> Result<Vec<(String, String)>> {
    if paths.is_empty() {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read standard input")?;
        return Ok(vec![(STDIN_FILE_NAME.to_string(), content)]);
    }

    paths
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| anyhow!("{} has no file name", path.display()))?;
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok((name, content))
        })
        .collect()
}
