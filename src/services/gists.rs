//! Gist creation.

use crate::client::RequestEngine;
use crate::errors::GitHubResult;
use crate::request::ApiRequest;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Service for gist operations.
pub struct GistsService {
    engine: Arc<RequestEngine>,
}

impl GistsService {
    pub(crate) fn new(engine: Arc<RequestEngine>) -> Self {
        Self { engine }
    }

    /// Creates a gist.
    pub async fn create(&self, request: &CreateGist) -> GitHubResult<Option<Value>> {
        let request = ApiRequest::post(["gists"]).with_json(request)?;
        self.engine.request(&request).await
    }
}

/// Content of one gist file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GistFile {
    /// File content.
    pub content: String,
}

/// Request to create a gist.
#[derive(Debug, Clone, Serialize)]
pub struct CreateGist {
    /// Files keyed by file name.
    pub files: BTreeMap<String, GistFile>,
    /// Whether the gist is public.
    pub public: bool,
    /// Gist description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateGist {
    /// Builds a public gist from `(file name, content)` pairs.
    pub fn from_files<I, N, C>(files: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(name, content)| {
                    (
                        name.into(),
                        GistFile {
                            content: content.into(),
                        },
                    )
                })
                .collect(),
            public: true,
            description: None,
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether the gist is public.
    pub fn public(mut self, public: bool) -> Self {
        self.public = public;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::GitHubClient;
    use crate::mocks::{MockResponse, MockTransport};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_from_files_defaults_to_public_without_description() {
        let gist = CreateGist::from_files([("a.txt", "hello")]);
        assert_eq!(
            serde_json::to_value(&gist).unwrap(),
            json!({"files": {"a.txt": {"content": "hello"}}, "public": true})
        );
    }

    #[test]
    fn test_description_and_visibility() {
        let gist = CreateGist::from_files([("a.txt", "hello")])
            .description("notes")
            .public(false);
        let body = serde_json::to_value(&gist).unwrap();
        assert_eq!(body["description"], "notes");
        assert_eq!(body["public"], false);
    }

    #[tokio::test]
    async fn test_create_posts_to_gists() {
        let transport = Arc::new(MockTransport::new());
        transport.on_post(
            "https://api.test/gists",
            MockResponse::created(&json!({"html_url": "https://gist.test/1"})),
        );
        let client = GitHubClient::builder()
            .base_url("https://api.test/")
            .token("t")
            .transport(transport.clone())
            .build()
            .unwrap();

        let gist = client
            .gists()
            .create(&CreateGist::from_files([("gistfile1", "data")]))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(gist["html_url"], "https://gist.test/1");
        assert_eq!(
            transport.requests()[0].json_body(),
            Some(json!({"files": {"gistfile1": {"content": "data"}}, "public": true}))
        );
    }
}
