//! Repository hooks, statuses and events.

use crate::client::RequestEngine;
use crate::errors::GitHubResult;
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Target URL sent with a commit status when the caller gives none.
pub const DEFAULT_STATUS_TARGET_URL: &str = "https://docs.github.com/rest/commits/statuses";

/// Service for repository operations.
pub struct RepositoriesService {
    engine: Arc<RequestEngine>,
}

impl RepositoriesService {
    pub(crate) fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// Lists repository events newest first, stopping before `until_id`.
    ///
    /// The events feed carries no usable Link header, so pages are walked
    /// until one comes back empty or the given event id shows up.
    pub async fn events(
        &self,
        owner: &str,
        repo: &str,
        until_id: Option<&str>,
    ) -> GitHubResult<Vec<Value>> {
        self.engine
            .request_until(["repos", owner, repo, "events"], until_id)
            .await
    }

    // Hooks

    /// Lists every hook of a repository.
    pub async fn hooks(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Value>> {
        self.engine
            .request_all_pages(["repos", owner, repo, "hooks"])
            .await
    }

    /// Gets a hook.
    pub async fn hook(&self, owner: &str, repo: &str, id: u64) -> GitHubResult<Option<Value>> {
        self.engine
            .request(&ApiRequest::get(hook_path(owner, repo, id)))
            .await
    }

    /// Creates a hook.
    pub async fn create_hook(
        &self,
        owner: &str,
        repo: &str,
        request: &CreateHookRequest,
    ) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::post(["repos", owner, repo, "hooks"]).with_json(request)?;
        self.engine.request(&request).await
    }

    /// Edits a hook. Only the fields set on `request` are sent.
    pub async fn edit_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        request: &EditHookRequest,
    ) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::patch(hook_path(owner, repo, id)).with_json(request)?;
        self.engine.request(&request).await
    }

    /// Triggers a push event for a hook.
    pub async fn test_hook(&self, owner: &str, repo: &str, id: u64) -> GitHubResult<Option<Value>> {
        let mut path = hook_path(owner, repo, id);
        path.push("tests".to_string());
        self.engine.request(&ApiRequest::post(path)).await
    }

    /// Deletes a hook.
    pub async fn delete_hook(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
    ) -> GitHubResult<Option<Value>> {
        self.engine
            .request(&ApiRequest::delete(hook_path(owner, repo, id)))
            .await
    }

    // Statuses

    /// Lists the statuses of a commit.
    pub async fn statuses(&self, owner: &str, repo: &str, sha: &str) -> GitHubResult<Option<Value>> {
        self.engine
            .request(&ApiRequest::get(["repos", owner, repo, "statuses", sha]))
            .await
    }

    /// Creates a commit status.
    pub async fn create_status(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
        request: &CreateStatusRequest,
    ) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::post(["repos", owner, repo, "statuses", sha])
            .with_json(&request.payload())?;
        self.engine.request(&request).await
    }
}

fn hook_path(owner: &str, repo: &str, id: u64) -> Vec<String> {
    vec![
        "repos".to_string(),
        owner.to_string(),
        repo.to_string(),
        "hooks".to_string(),
        id.to_string(),
    ]
}

/// Request to create a hook.
#[derive(Debug, Clone, Serialize)]
pub struct CreateHookRequest {
    /// Hook name, `web` for webhooks.
    pub name: String,
    /// Hook configuration (url, content_type, secret, ...).
    pub config: Value,
    /// Events that trigger the hook.
    pub events: Vec<String>,
    /// Whether the hook is active.
    pub active: bool,
}

/// Request to edit a hook.
///
/// `name` and `config` are always sent. Every other field is sent only
/// when set; unset fields do not appear in the body at all.
#[derive(Debug, Clone, Serialize)]
pub struct EditHookRequest {
    /// Hook name.
    pub name: String,
    /// Hook configuration.
    pub config: Value,
    /// Replaces the event list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<String>>,
    /// Events to add.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_events: Option<Vec<String>>,
    /// Events to remove.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_events: Option<Vec<String>>,
    /// Whether the hook is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl EditHookRequest {
    /// Creates an edit with only the required fields.
    pub fn new(name: impl Into<String>, config: Value) -> Self {
        Self {
            name: name.into(),
            config,
            events: None,
            add_events: None,
            remove_events: None,
            active: None,
        }
    }

    /// Replaces the event list.
    pub fn events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Adds events.
    pub fn add_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Removes events.
    pub fn remove_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.remove_events = Some(events.into_iter().map(Into::into).collect());
        self
    }

    /// Sets whether the hook is active.
    pub fn active(mut self, active: bool) -> Self {
        self.active = Some(active);
        self
    }
}

/// Commit status state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    /// Pending.
    Pending,
    /// Success.
    Success,
    /// Error.
    Error,
    /// Failure.
    Failure,
}

impl StatusState {
    /// The state as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Error => "error",
            Self::Failure => "failure",
        }
    }
}

/// Request to create a commit status.
#[derive(Debug, Clone)]
pub struct CreateStatusRequest {
    /// Status state.
    pub state: StatusState,
    /// Link shown next to the status. Defaults to
    /// [`DEFAULT_STATUS_TARGET_URL`].
    pub target_url: Option<String>,
    /// Short description. Defaults to the state name.
    pub description: Option<String>,
    /// Label distinguishing this status from other systems' statuses.
    pub context: Option<String>,
}

impl CreateStatusRequest {
    /// Creates a status request with defaults for everything but `state`.
    pub fn new(state: StatusState) -> Self {
        Self {
            state,
            target_url: None,
            description: None,
            context: None,
        }
    }

    /// Sets the target URL.
    pub fn target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the context.
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    fn payload(&self) -> StatusPayload<'_> {
        StatusPayload {
            state: self.state,
            target_url: self
                .target_url
                .as_deref()
                .unwrap_or(DEFAULT_STATUS_TARGET_URL),
            description: self
                .description
                .as_deref()
                .unwrap_or_else(|| self.state.as_str()),
            context: self.context.as_deref(),
        }
    }
}

#[derive(Serialize)]
struct StatusPayload<'a> {
    state: StatusState,
    target_url: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}
