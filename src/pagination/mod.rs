//! Link-header pagination.
//!
//! Pages are always fetched one after another: whether page N+1 exists is
//! only known once page N's `Link` header has arrived. Each walk reads the
//! headers of the response it just received, never the client-wide
//! "last response" snapshot, so concurrent walks on one client cannot
//! steer each other.

use crate::client::RequestEngine;
use crate::errors::{GitHubError, GitHubResult};
use crate::request::ApiRequest;
use reqwest::header::{HeaderMap, LINK};
use serde_json::Value;

/// How the full-drain walker chooses the next request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageStrategy {
    /// Request `page + 1` whenever a `rel="next"` link is present.
    #[default]
    Sequential,
    /// Request the literal `rel="next"` URL. It must live under the
    /// configured base URL.
    FollowNextLink,
}

/// One `<url>; rel="relation"` entry of a Link header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDirective {
    /// Target URL.
    pub url: String,
    /// Relation, e.g. `next` or `last`.
    pub relation: String,
}

impl LinkDirective {
    /// Parses every directive in one Link header value.
    ///
    /// An empty value yields no directives. A directive without a `<url>`
    /// or without a `rel` parameter is an error.
    pub fn parse_all(value: &str) -> GitHubResult<Vec<Self>> {
        let mut directives = Vec::new();
        let mut rest = value.trim();

        while !rest.is_empty() {
            let after_open = rest
                .strip_prefix('<')
                .ok_or_else(|| malformed(value, "expected '<'"))?;
            let close = after_open
                .find('>')
                .ok_or_else(|| malformed(value, "unterminated '<'"))?;
            let url = after_open[..close].trim();
            if url.is_empty() {
                return Err(malformed(value, "empty target URL"));
            }

            let tail = &after_open[close + 1..];
            let end = unquoted_end(tail, ',');
            let relation = split_unquoted(&tail[..end], ';')
                .into_iter()
                .filter_map(|param| param.split_once('='))
                .find(|(key, _)| key.trim().eq_ignore_ascii_case("rel"))
                .map(|(_, rel)| rel.trim().trim_matches('"').to_string())
                .filter(|rel| !rel.is_empty())
                .ok_or_else(|| malformed(value, "directive has no rel parameter"))?;

            directives.push(Self {
                url: url.to_string(),
                relation,
            });

            rest = tail[end..].trim_start_matches(',').trim_start();
        }

        Ok(directives)
    }

    /// Returns true if the relation list names `relation`.
    pub fn has_relation(&self, relation: &str) -> bool {
        self.relation
            .split_whitespace()
            .any(|r| r.eq_ignore_ascii_case(relation))
    }
}

/// Index of the first `separator` outside quotes, or the length.
fn unquoted_end(s: &str, separator: char) -> usize {
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c == separator && !in_quotes => return i,
            _ => {}
        }
    }
    s.len()
}

/// Splits on `separator`, skipping separators inside quoted strings.
fn split_unquoted(mut s: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    loop {
        let end = unquoted_end(s, separator);
        parts.push(&s[..end]);
        if end == s.len() {
            return parts;
        }
        s = &s[end + separator.len_utf8()..];
    }
}

fn malformed(value: &str, reason: &str) -> GitHubError {
    GitHubError::malformed_link(format!("Malformed Link header ({}): {}", reason, value))
}

/// Pagination links parsed from Link header.
#[derive(Debug, Clone, Default)]
pub struct PaginationLinks {
    /// URL for the next page.
    pub next: Option<String>,
    /// URL for the previous page.
    pub prev: Option<String>,
    /// URL for the first page.
    pub first: Option<String>,
    /// URL for the last page.
    pub last: Option<String>,
}

impl PaginationLinks {
    /// Parses pagination links from one Link header value.
    pub fn from_header(header_value: &str) -> GitHubResult<Self> {
        let mut links = Self::default();
        links.absorb(LinkDirective::parse_all(header_value)?);
        Ok(links)
    }

    /// Parses every Link header in a response.
    ///
    /// No Link header at all means no further pages.
    pub fn from_headers(headers: &HeaderMap) -> GitHubResult<Self> {
        let mut links = Self::default();
        for value in headers.get_all(LINK) {
            let value = value
                .to_str()
                .map_err(|_| GitHubError::malformed_link("Link header is not valid UTF-8"))?;
            links.absorb(LinkDirective::parse_all(value)?);
        }
        Ok(links)
    }

    fn absorb(&mut self, directives: Vec<LinkDirective>) {
        for directive in directives {
            for (rel, slot) in [
                ("next", &mut self.next),
                ("prev", &mut self.prev),
                ("first", &mut self.first),
                ("last", &mut self.last),
            ] {
                if slot.is_none() && directive.has_relation(rel) {
                    *slot = Some(directive.url.clone());
                }
            }
        }
    }

    /// Returns true if there is a next page.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns true if there is a previous page.
    pub fn has_prev(&self) -> bool {
        self.prev.is_some()
    }
}

/// True when an event's `id` equals `until_id`, whether the id is a JSON
/// string or a number.
fn matches_id(item: &Value, until_id: &str) -> bool {
    match item.get("id") {
        Some(Value::String(id)) => id == until_id,
        Some(Value::Number(id)) => id.to_string() == until_id,
        _ => false,
    }
}

impl RequestEngine {
    /// Fetches every page of a collection and concatenates the items.
    ///
    /// Walks pages 0, 1, 2, ... until a response carries no `rel="next"`
    /// link. Empty pages do not stop the walk; only the Link header does.
    pub async fn request_all_pages<I, S>(&self, segments: I) -> GitHubResult<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let first = ApiRequest::get(segments);
        let mut request = first.clone();
        let mut page = 0u32;
        let mut items = Vec::new();

        loop {
            let response = self.send(&request).await?;
            let links = response.links()?;
            items.extend(response.into_items()?);

            let Some(next) = links.next else {
                break;
            };

            request = match self.config().page_strategy {
                PageStrategy::Sequential => {
                    page += 1;
                    first.clone().with_page(page)
                }
                PageStrategy::FollowNextLink => {
                    if !next.starts_with(&self.config().base_url) {
                        return Err(GitHubError::malformed_link(format!(
                            "next link {} is outside {}",
                            next,
                            self.config().base_url
                        )));
                    }
                    ApiRequest::absolute(next)
                }
            };
        }

        tracing::debug!(target: "github", items = items.len(), "pagination complete");
        Ok(items)
    }

    /// Collects items page by page until `until_id` is seen or a page
    /// comes back empty.
    ///
    /// The matching item is excluded and no further page is requested.
    /// With no `until_id` the walk runs to the first empty page.
    pub async fn request_until<I, S>(
        &self,
        segments: I,
        until_id: Option<&str>,
    ) -> GitHubResult<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let first = ApiRequest::get(segments);
        let mut page = 0u32;
        let mut collected = Vec::new();

        loop {
            let items = self
                .send(&first.clone().with_page(page))
                .await?
                .into_items()?;
            if items.is_empty() {
                break;
            }

            for item in items {
                if until_id.is_some_and(|id| matches_id(&item, id)) {
                    return Ok(collected);
                }
                collected.push(item);
            }
            page += 1;
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::GitHubErrorKind;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_parse_link_header() {
        let header = r#"<https://api.github.com/repos?page=2>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#;
        let links = PaginationLinks::from_header(header).unwrap();

        assert_eq!(links.next, Some("https://api.github.com/repos?page=2".to_string()));
        assert_eq!(links.last, Some("https://api.github.com/repos?page=5".to_string()));
        assert!(links.prev.is_none());
        assert!(links.first.is_none());
    }

    #[test]
    fn test_parse_full_link_header() {
        let header = r#"<https://api.github.com/repos?page=1>; rel="first", <https://api.github.com/repos?page=2>; rel="prev", <https://api.github.com/repos?page=4>; rel="next", <https://api.github.com/repos?page=5>; rel="last""#;
        let links = PaginationLinks::from_header(header).unwrap();

        assert!(links.first.is_some());
        assert!(links.has_prev());
        assert!(links.has_next());
        assert!(links.last.is_some());
    }

    #[test]
    fn test_no_next_relation() {
        let header = r#"<https://api.github.com/repos?page=1>; rel="first", <https://api.github.com/repos?page=1>; rel="prev""#;
        let links = PaginationLinks::from_header(header).unwrap();
        assert!(!links.has_next());
    }

    #[test]
    fn test_directive_with_extra_params_and_unquoted_rel() {
        let directives =
            LinkDirective::parse_all(r#"<https://x/a?page=2>; title="a, b"; rel=next"#).unwrap();

        assert_eq!(
            directives,
            vec![LinkDirective {
                url: "https://x/a?page=2".to_string(),
                relation: "next".to_string(),
            }]
        );
    }

    #[test]
    fn test_rel_inside_quoted_parameter_is_ignored() {
        let links = PaginationLinks::from_header(
            r#"<https://x/a?page=2>; title="x; rel=prev"; rel="next""#,
        )
        .unwrap();

        assert_eq!(links.next.as_deref(), Some("https://x/a?page=2"));
        assert!(links.prev.is_none());
    }

    #[test]
    fn test_split_unquoted() {
        assert_eq!(
            split_unquoted(r#" a; b="1;2"; c"#, ';'),
            vec![" a", r#" b="1;2""#, " c"]
        );
        assert_eq!(split_unquoted("", ';'), vec![""]);
    }

    #[test]
    fn test_multiple_relations_in_one_directive() {
        let directives = LinkDirective::parse_all(r#"<https://x/a?page=2>; rel="next last""#).unwrap();
        assert!(directives[0].has_relation("next"));
        assert!(directives[0].has_relation("last"));
        assert!(!directives[0].has_relation("prev"));
    }

    #[test]
    fn test_empty_value_has_no_directives() {
        assert!(LinkDirective::parse_all("   ").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_headers_are_errors() {
        for header in [
            r#"https://x/a; rel="next""#,
            r#"<https://x/a; rel="next""#,
            r#"<https://x/a>; title="no rel""#,
            r#"<>; rel="next""#,
            r#"<https://x/a>; rel="next", garbage"#,
        ] {
            let error = PaginationLinks::from_header(header).unwrap_err();
            assert_eq!(error.kind(), &GitHubErrorKind::MalformedLinkHeader, "{}", header);
        }
    }

    #[test]
    fn test_from_headers_reads_every_link_value() {
        let mut headers = HeaderMap::new();
        headers.append(LINK, HeaderValue::from_static(r#"<https://x/a?page=1>; rel="prev""#));
        headers.append(LINK, HeaderValue::from_static(r#"<https://x/a?page=3>; rel="next""#));

        let links = PaginationLinks::from_headers(&headers).unwrap();
        assert_eq!(links.prev.as_deref(), Some("https://x/a?page=1"));
        assert_eq!(links.next.as_deref(), Some("https://x/a?page=3"));
    }

    #[test]
    fn test_from_headers_without_link() {
        let links = PaginationLinks::from_headers(&HeaderMap::new()).unwrap();
        assert!(!links.has_next());
    }

    #[test]
    fn test_matches_id() {
        assert!(matches_id(&json!({"id": 2}), "2"));
        assert!(matches_id(&json!({"id": "2"}), "2"));
        assert!(!matches_id(&json!({"id": 3}), "2"));
        assert!(!matches_id(&json!({"name": "2"}), "2"));
    }
}
