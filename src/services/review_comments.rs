//! Pull request review comments.

use crate::client::RequestEngine;
use crate::errors::GitHubResult;
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

/// Service for line comments on pull request diffs.
pub struct ReviewCommentsService {
    engine: Arc<RequestEngine>,
}

impl ReviewCommentsService {
    pub(crate) fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// Lists every review comment in a repository.
    pub async fn repo_comments(&self, owner: &str, repo: &str) -> GitHubResult<Vec<Value>> {
        self.engine
            .request_all_pages(["repos", owner, repo, "pulls", "comments"])
            .await
    }

    /// Lists every review comment on one pull request.
    pub async fn pull_request_comments(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> GitHubResult<Vec<Value>> {
        self.engine
            .request_all_pages(pull_comments_path(owner, repo, number))
            .await
    }

    /// Gets a review comment.
    pub async fn comment(&self, owner: &str, repo: &str, id: u64) -> GitHubResult<Option<Value>> {
        self.engine
            .request(&ApiRequest::get(comment_path(owner, repo, id)))
            .await
    }

    /// Comments on a line of a pull request diff.
    pub async fn create(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        request: &CreateReviewComment,
    ) -> GitHubResult<Option<Value>> {
        let request =
            ApiRequest::post(pull_comments_path(owner, repo, number)).with_json(request)?;
        self.engine.request(&request).await
    }

    /// Replies to an existing review comment.
    pub async fn reply(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        body: &str,
        in_reply_to: u64,
    ) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::post(pull_comments_path(owner, repo, number))
            .with_json(&ReplyBody { body, in_reply_to })?;
        self.engine.request(&request).await
    }

    /// Replaces the body of a review comment.
    pub async fn edit(
        &self,
        owner: &str,
        repo: &str,
        id: u64,
        body: &str,
    ) -> GitHubResult<Option<Value>> {
        let request =
            ApiRequest::patch(comment_path(owner, repo, id)).with_json(&EditBody { body })?;
        self.engine.request(&request).await
    }

    /// Deletes a review comment.
    pub async fn delete(&self, owner: &str, repo: &str, id: u64) -> GitHubResult<Option<Value>> {
        self.engine
            .request(&ApiRequest::delete(comment_path(owner, repo, id)))
            .await
    }
}

fn pull_comments_path(owner: &str, repo: &str, number: u64) -> [String; 6] {
    [
        "repos".to_string(),
        owner.to_string(),
        repo.to_string(),
        "pulls".to_string(),
        number.to_string(),
        "comments".to_string(),
    ]
}

fn comment_path(owner: &str, repo: &str, id: u64) -> [String; 6] {
    [
        "repos".to_string(),
        owner.to_string(),
        repo.to_string(),
        "pulls".to_string(),
        "comments".to_string(),
        id.to_string(),
    ]
}

/// Request to comment on a diff line.
#[derive(Debug, Clone, Serialize)]
pub struct CreateReviewComment {
    /// Comment text.
    pub body: String,
    /// SHA of the commit being commented on.
    pub commit_id: String,
    /// File path relative to the repository root.
    pub path: String,
    /// Line index in the diff.
    pub position: u32,
}

#[derive(Serialize)]
struct ReplyBody<'a> {
    body: &'a str,
    in_reply_to: u64,
}

#[derive(Serialize)]
struct EditBody<'a> {
    body: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GitHubClient;
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;
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
    async fn test_pull_request_comments_follow_pages() {
        let transport = Arc::new(MockTransport::new().fail_unmatched());
        transport.on_get(
            "https://api.test/repos/o/r/pulls/3/comments",
            MockResponse::ok(&json!([{"id": 1}]))
                .with_next_link("https://api.test/repos/o/r/pulls/3/comments?page=2"),
        );
        transport.on_get(
            "https://api.test/repos/o/r/pulls/3/comments?page=1",
            MockResponse::ok(&json!([{"id": 2}])),
        );

        let comments = client(&transport)
            .reviews()
            .pull_request_comments("o", "r", 3)
            .await
            .unwrap();

        assert_eq!(comments, vec![json!({"id": 1}), json!({"id": 2})]);
    }

    #[tokio::test]
    async fn test_create_comment_body() {
        let transport = Arc::new(MockTransport::new());
        transport.on_post(
            "https://api.test/repos/o/r/pulls/3/comments",
            MockResponse::created(&json!({"id": 10})),
        );

        let request = CreateReviewComment {
            body: "nit".into(),
            commit_id: "abc".into(),
            path: "src/lib.rs".into(),
            position: 4,
        };
        client(&transport)
            .reviews()
            .create("o", "r", 3, &request)
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].json_body(),
            Some(json!({"body": "nit", "commit_id": "abc", "path": "src/lib.rs", "position": 4}))
        );
    }

    #[tokio::test]
    async fn test_reply_body() {
        let transport = Arc::new(MockTransport::new());
        transport.on_post(
            "https://api.test/repos/o/r/pulls/3/comments",
            MockResponse::created(&json!({"id": 11})),
        );

        client(&transport)
            .reviews()
            .reply("o", "r", 3, "done", 10)
            .await
            .unwrap();

        assert_eq!(
            transport.requests()[0].json_body(),
            Some(json!({"body": "done", "in_reply_to": 10}))
        );
    }

    #[tokio::test]
    async fn test_edit_uses_patch() {
        let transport = Arc::new(MockTransport::new());
        transport.on_patch(
            "https://api.test/repos/o/r/pulls/comments/10",
            MockResponse::ok(&json!({"id": 10, "body": "fixed"})),
        );

        let comment = client(&transport)
            .reviews()
            .edit("o", "r", 10, "fixed")
            .await
            .unwrap();

        assert_eq!(comment, Some(json!({"id": 10, "body": "fixed"})));
        assert_eq!(transport.requests()[0].method, "PATCH");
    }

    #[tokio::test]
    async fn test_delete_comment() {
        let transport = Arc::new(MockTransport::new());
        transport.on_delete(
            "https://api.test/repos/o/r/pulls/comments/10",
            MockResponse::no_content(),
        );

        let result = client(&transport)
            .reviews()
            .delete("o", "r", 10)
            .await
            .unwrap();

        assert_eq!(result, None);
        let requests = transport.requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(requests[0].url, "https://api.test/repos/o/r/pulls/comments/10");
        assert!(requests[0].body.is_none());
    }

    #[tokio::test]
    async fn test_missing_comment_is_not_found() {
        let transport = Arc::new(MockTransport::new());

        let error = client(&transport)
            .reviews()
            .comment("o", "r", 404)
            .await
            .unwrap_err();

        assert_eq!(error.status_code(), Some(404));
    }
}
