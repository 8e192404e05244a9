//! Issue comment operations.

use crate::client::RequestEngine;
use crate::errors::GitHubResult;
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Service for comments on issues and pull request conversations.
pub struct IssueCommentsService {
    engine: Arc<RequestEngine>,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    body: &'a str,
}

impl IssueCommentsService {
    pub(crate) fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// Comments on an issue or pull request.
    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
    ) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::post([
            "repos".to_string(),
            owner.to_string(),
            repo.to_string(),
            "issues".to_string(),
            number.to_string(),
            "comments".to_string(),
        ])
        .with_json(&CommentBody { body })?;
        self.engine.request(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GitHubClient;
    use crate::mocks::{MockResponse, MockTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_create_comment() {
        let transport = Arc::new(MockTransport::new());
        transport.on_post(
            "https://api.test/repos/o/r/issues/4/comments",
            MockResponse::created(&json!({"id": 100, "body": "hi"})),
        );
        let client = GitHubClient::builder()
            .base_url("https://api.test")
            .token("t")
            .transport(transport.clone())
            .build()
            .unwrap();

        let comment = client.comments().create("o", "r", 4, "hi").await.unwrap();

        assert_eq!(comment, Some(json!({"id": 100, "body": "hi"})));
        assert_eq!(transport.requests()[0].json_body(), Some(json!({"body": "hi"})));
    }
}
