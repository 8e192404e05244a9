//! Request engine tests against a live mock server.

use integrations_github_rest::{
    ApiRequest, ErrorCategory, GitHubClient, GitHubErrorKind, PageStrategy,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn client(server: &MockServer) -> GitHubClient {
    GitHubClient::builder()
        .base_url(server.uri())
        .token("test-token")
        .build()
        .expect("Failed to build client")
}

fn first_page(request: &Request) -> bool {
    request.url.query().is_none()
}

#[tokio::test]
async fn test_get_sends_token_and_decodes_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks/1"))
        .and(header("authorization", "token test-token"))
        .and(header("accept", "application/vnd.github+json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": 1}))
                .insert_header("x-github-request-id", "ABC"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let hook = client.repos().hook("o", "r", 1).await.unwrap();

    assert_eq!(hook, Some(json!({"id": 1})));
    let headers = client.last_response_headers().unwrap();
    assert_eq!(headers.get("x-github-request-id").unwrap(), "ABC");
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/repos/o/r/issues/2/comments"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"body": "looks good"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 9})))
        .expect(1)
        .mount(&server)
        .await;

    let comment = client(&server)
        .comments()
        .create("o", "r", 2, "looks good")
        .await
        .unwrap();

    assert_eq!(comment, Some(json!({"id": 9})));
}

#[tokio::test]
async fn test_no_content_and_empty_ok_both_yield_none() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/repos/o/r/hooks/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/empty"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = client(&server);

    assert_eq!(client.repos().delete_hook("o", "r", 1).await.unwrap(), None);
    assert_eq!(client.request(&ApiRequest::get(["empty"])).await.unwrap(), None);
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/old/r/hooks/1"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", "https://elsewhere/repos/new/r"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server)
        .repos()
        .hook("old", "r", 1)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), &GitHubErrorKind::Redirect);
    assert_eq!(error.status_code(), Some(301));
    assert_eq!(error.location(), Some("https://elsewhere/repos/new/r"));
}

#[tokio::test]
async fn test_invalid_json_is_a_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let error = client(&server)
        .request(&ApiRequest::get(["broken"]))
        .await
        .unwrap_err();

    assert_eq!(error.kind(), &GitHubErrorKind::InvalidJson);
    assert_eq!(error.category(), ErrorCategory::Protocol);
    assert_eq!(error.body(), Some("<html>oops</html>"));
}

#[tokio::test]
async fn test_remote_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    let body = json!({
        "message": "Not Found",
        "documentation_url": "https://docs.github.com/rest"
    });
    Mock::given(method("GET"))
        .and(path("/repos/o/missing/hooks/1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(body.clone()))
        .mount(&server)
        .await;

    let error = client(&server)
        .repos()
        .hook("o", "missing", 1)
        .await
        .unwrap_err();

    assert_eq!(error.kind(), &GitHubErrorKind::NotFound);
    assert_eq!(error.category(), ErrorCategory::RemoteApi);
    assert_eq!(error.status_code(), Some(404));
    assert_eq!(error.message(), "Not Found");
    assert_eq!(error.documentation_url(), Some("https://docs.github.com/rest"));
    let preserved: serde_json::Value = serde_json::from_str(error.body().unwrap()).unwrap();
    assert_eq!(preserved, body);
}

#[tokio::test]
async fn test_exhausted_rate_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"message": "API rate limit exceeded"}))
                .insert_header("x-ratelimit-limit", "5000")
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1700000000"),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let error = client.request(&ApiRequest::get(["user"])).await.unwrap_err();

    assert_eq!(error.kind(), &GitHubErrorKind::RateLimitExceeded);
    assert_eq!(error.rate_limit().map(|r| r.remaining), Some(0));
    assert!(client.rate_limit_warning_issued());
}

#[tokio::test]
async fn test_full_drain_requests_sequential_pages() {
    let server = MockServer::start().await;
    let next = format!("<{}/repos/o/r/hooks?page=2>; rel=\"next\"", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks"))
        .and(first_page)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["a"]))
                .insert_header("link", next.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["b"]))
                .insert_header("link", next.as_str()),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["c"])))
        .expect(1)
        .mount(&server)
        .await;

    let hooks = client(&server).repos().hooks("o", "r").await.unwrap();

    assert_eq!(hooks, vec![json!("a"), json!("b"), json!("c")]);
}

#[tokio::test]
async fn test_follow_next_link_uses_literal_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/pulls/comments"))
        .and(first_page)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": 1}]))
                .insert_header(
                    "link",
                    format!(
                        "<{}/repos/o/r/pulls/comments?per_page=1&page=7>; rel=\"next\"",
                        server.uri()
                    )
                    .as_str(),
                ),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/pulls/comments"))
        .and(query_param("page", "7"))
        .and(query_param("per_page", "1"))
        .and(header("authorization", "token test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::builder()
        .base_url(server.uri())
        .token("test-token")
        .page_strategy(PageStrategy::FollowNextLink)
        .build()
        .unwrap();

    let comments = client.reviews().repo_comments("o", "r").await.unwrap();

    assert_eq!(comments, vec![json!({"id": 1}), json!({"id": 2})]);
}

#[tokio::test]
async fn test_follow_next_link_refuses_foreign_host() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .insert_header("link", "<https://attacker.test/steal?page=2>; rel=\"next\""),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GitHubClient::builder()
        .base_url(server.uri())
        .token("test-token")
        .page_strategy(PageStrategy::FollowNextLink)
        .build()
        .unwrap();

    let error = client.repos().hooks("o", "r").await.unwrap_err();
    assert_eq!(error.kind(), &GitHubErrorKind::MalformedLinkHeader);
}

#[tokio::test]
async fn test_malformed_link_header_fails_the_walk() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/o/r/hooks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!(["a"]))
                .insert_header("link", "page=2; next"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let error = client(&server).repos().hooks("o", "r").await.unwrap_err();
    assert_eq!(error.kind(), &GitHubErrorKind::MalformedLinkHeader);
    assert_eq!(error.category(), ErrorCategory::Protocol);
}

#[tokio::test]
async fn test_connection_failure_is_a_transport_error() {
    let client = GitHubClient::builder()
        .base_url("http://127.0.0.1:1/")
        .token("test-token")
        .build()
        .unwrap();

    let error = client.request(&ApiRequest::get(["user"])).await.unwrap_err();
    assert_eq!(error.category(), ErrorCategory::Transport);
}
