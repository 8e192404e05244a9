//! Pull request operations.

use crate::client::RequestEngine;
use crate::errors::{GitHubError, GitHubResult};
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Service for pull request operations.
pub struct PullRequestsService {
    engine: Arc<RequestEngine>,
}

impl PullRequestsService {
    pub(crate) fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// Edits a pull request.
    ///
    /// Fails with a validation error, without sending anything, when no
    /// field is set or when `state` is neither `open` nor `closed`.
    pub async fn edit(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        request: &EditPullRequest,
    ) -> GitHubResult<Option<Value>> {
        request.validate()?;
        let request = ApiRequest::patch([
            "repos".to_string(),
            owner.to_string(),
            repo.to_string(),
            "pulls".to_string(),
            number.to_string(),
        ])
        .with_json(request)?;
        self.engine.request(&request).await
    }
}

/// Request to edit a pull request. Unset fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EditPullRequest {
    /// New title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// New body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// New state, `open` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl EditPullRequest {
    /// Creates an empty edit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets the state.
    pub fn state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Checks the edit before it is sent.
    pub fn validate(&self) -> GitHubResult<()> {
        if self.title.is_none() && self.body.is_none() && self.state.is_none() {
            return Err(GitHubError::validation(
                "must provide at least one of: title, body, state",
            ));
        }
        match self.state.as_deref() {
            None | Some("open") | Some("closed") => Ok(()),
            Some(_) => Err(GitHubError::validation(
                "state must be either 'open' or 'closed'",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GitHubClient;
    use crate::errors::GitHubErrorKind;
    use crate::mocks::{MockResponse, MockTransport};
    use serde_json::json;

    fn client(transport: &Arc<MockTransport>) -> GitHubClient {
        GitHubClient::builder()
            .base_url("https://api.test/")
            .token("t")
            .transport(transport.clone())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_edit_without_fields_is_rejected() {
        let transport = Arc::new(MockTransport::new());

        let error = client(&transport)
            .pulls()
            .edit("o", "r", 1, &EditPullRequest::new())
            .await
            .unwrap_err();

        assert_eq!(error.kind(), &GitHubErrorKind::ValidationError);
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_edit_with_bad_state_is_rejected() {
        let transport = Arc::new(MockTransport::new());

        let error = client(&transport)
            .pulls()
            .edit("o", "r", 1, &EditPullRequest::new().state("blub"))
            .await
            .unwrap_err();

        assert_eq!(error.kind(), &GitHubErrorKind::ValidationError);
        assert!(error.message().contains("'open'"));
        assert!(error.message().contains("'closed'"));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_edit_sends_only_set_fields() {
        let transport = Arc::new(MockTransport::new());
        transport.on_patch(
            "https://api.test/repos/o/r/pulls/12",
            MockResponse::ok(&json!({"number": 12})),
        );

        let result = client(&transport)
            .pulls()
            .edit("o", "r", 12, &EditPullRequest::new().title("new").state("closed"))
            .await
            .unwrap();

        assert_eq!(result, Some(json!({"number": 12})));
        assert_eq!(
            transport.requests()[0].json_body(),
            Some(json!({"title": "new", "state": "closed"}))
        );
    }
}
