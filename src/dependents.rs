use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::time::Duration;
use tracing::{debug, info, warn};

use crate::error::DependentsError;

/// Base URL of the public GitHub REST API.
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// Manifest file searched when no other filename is configured.
pub const DEFAULT_MANIFEST: &str = "go.mod";

/// Upper bound for the whole search request, connect through body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A repository whose manifest references the searched module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Repository {
    /// `owner/repo`, unique within one fetch result.
    pub full_name: String,
    /// Browsable link to the repository.
    pub url: String,
}

/// The subset of a code search response that is consumed.
///
/// Missing or `null` fields decode as absent so that a sparse hit is skipped
/// instead of failing the whole page.
#[derive(Debug, Default, Deserialize)]
pub struct SearchResponse {
    pub items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchItem {
    pub repository: Option<RepositoryDescriptor>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RepositoryDescriptor {
    pub full_name: Option<String>,
    pub html_url: Option<String>,
}

/// Settings for [`DependentsSearcher`].
///
/// The token is injected here rather than read from the environment so the
/// searcher never touches process state.
#[derive(Clone)]
pub struct SearchConfig {
    pub token: Option<String>,
    pub api_base: String,
    pub manifest: String,
    pub timeout: Duration,
}

impl SearchConfig {
    pub fn new(token: Option<String>) -> Self {
        SearchConfig {
            token,
            api_base: GITHUB_API_BASE.to_string(),
            manifest: DEFAULT_MANIFEST.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_manifest(mut self, manifest: impl Into<String>) -> Self {
        self.manifest = manifest.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

pub struct DependentsSearcher {
    client: Client,
    config: SearchConfig,
}

impl DependentsSearcher {
    /// Create a new DependentsSearcher instance
    pub fn new(config: SearchConfig) -> Result<Self, DependentsError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(DependentsError::Request)?;

        Ok(DependentsSearcher { client, config })
    }

    /// Search for repositories whose manifest mentions `module_path`.
    ///
    /// Issues a single search request asking for `max_results` hits and
    /// returns the hits deduplicated by repository name, in response order.
    /// `max_results` is only forwarded as `per_page`; the returned list is
    /// not truncated to it.
    pub async fn fetch(
        &self,
        module_path: &str,
        max_results: u32,
    ) -> Result<Vec<Repository>, DependentsError> {
        let token = match self.config.token.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => return Err(DependentsError::MissingToken),
        };

        let query = build_query(module_path, &self.config.manifest);
        let url = format!(
            "{}/search/code",
            self.config.api_base.trim_end_matches('/')
        );

        let request = self
            .client
            .get(&url)
            .query(&[("q", query.as_str())])
            .query(&[("per_page", max_results)])
            .header(ACCEPT, "application/vnd.github+json")
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("X-GitHub-Api-Version", "2022-11-28")
            .build()
            .map_err(DependentsError::Request)?;

        debug!("Requesting URL: {}", request.url());
        let response = self
            .client
            .execute(request)
            .await
            .map_err(DependentsError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            if let Some(reset) = rate_limit_reset(response.headers()) {
                let wait_secs = (reset - Utc::now()).num_seconds().max(0);
                warn!(
                    "Search rate limit exhausted, resets at {} ({}s)",
                    reset.to_rfc3339(),
                    wait_secs
                );
            }
            return Err(DependentsError::Api { status });
        }

        let body = response
            .bytes()
            .await
            .map_err(DependentsError::Transport)?;
        let parsed: SearchResponse = serde_json::from_slice(&body)?;
        let items = parsed.items.unwrap_or_default();
        let hits = items.len();

        let repos = dedup_repositories(items);
        info!(
            "Found {} unique repositories in {} hits for '{}'",
            repos.len(),
            hits,
            module_path
        );
        Ok(repos)
    }
}

/// Exact-phrase match on the module path, restricted to manifest files.
pub fn build_query(module_path: &str, manifest: &str) -> String {
    format!("\"{}\" filename:{}", module_path, manifest)
}

/// Collapse search hits into repositories, keeping the first hit per name.
///
/// Hits without a repository name are dropped.
pub fn dedup_repositories(items: Vec<SearchItem>) -> Vec<Repository> {
    let mut seen = HashSet::new();
    let mut results = Vec::with_capacity(items.len());

    for item in items {
        let Some(repo) = item.repository else {
            continue;
        };
        let full_name = repo.full_name.unwrap_or_default();
        if full_name.is_empty() || seen.contains(&full_name) {
            continue;
        }
        seen.insert(full_name.clone());

        results.push(Repository {
            full_name,
            url: repo.html_url.unwrap_or_default(),
        });
    }

    results
}

/// Reset time of an exhausted rate limit window, if the headers report one.
fn rate_limit_reset(headers: &HeaderMap) -> Option<DateTime<Utc>> {
    if header_number(headers, "X-RateLimit-Remaining")? != 0 {
        return None;
    }
    let reset = header_number(headers, "X-RateLimit-Reset")?;
    DateTime::<Utc>::from_timestamp(i64::try_from(reset).ok()?, 0)
}

fn header_number(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde_json::json;

    fn items(value: serde_json::Value) -> Vec<SearchItem> {
        let response: SearchResponse = serde_json::from_value(value).unwrap();
        response.items.unwrap_or_default()
    }

    fn repo(full_name: &str, url: &str) -> Repository {
        Repository {
            full_name: full_name.to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn query_quotes_module_and_filters_manifest() {
        assert_eq!(
            build_query("go.opentelemetry.io/otel", "go.mod"),
            "\"go.opentelemetry.io/otel\" filename:go.mod"
        );
        assert_eq!(
            build_query("serde", "Cargo.toml"),
            "\"serde\" filename:Cargo.toml"
        );
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let hits = items(json!({
            "items": [
                {"repository": {"full_name": "c/d", "html_url": "u2"}},
                {"repository": {"full_name": "a/b", "html_url": "u1"}},
                {"repository": {"full_name": "c/d", "html_url": "other"}},
                {"repository": {"full_name": "e/f", "html_url": "u3"}},
                {"repository": {"full_name": "a/b", "html_url": "u1"}}
            ]
        }));

        assert_eq!(
            dedup_repositories(hits),
            vec![repo("c/d", "u2"), repo("a/b", "u1"), repo("e/f", "u3")]
        );
    }

    #[test]
    fn dedup_skips_unnamed_hits_anywhere() {
        let hits = items(json!({
            "items": [
                {"repository": {"full_name": "", "html_url": "u0"}},
                {"repository": {"full_name": "a/b", "html_url": "u1"}},
                {"repository": {"html_url": "u2"}},
                {"repository": null},
                {},
                {"repository": {"full_name": null, "html_url": "u3"}},
                {"repository": {"full_name": "", "html_url": "u4"}}
            ]
        }));

        assert_eq!(dedup_repositories(hits), vec![repo("a/b", "u1")]);
    }

    #[test]
    fn missing_url_becomes_empty() {
        let hits = items(json!({"items": [{"repository": {"full_name": "a/b"}}]}));
        assert_eq!(dedup_repositories(hits), vec![repo("a/b", "")]);
    }

    #[test]
    fn missing_items_decodes_as_empty() {
        assert!(items(json!({"total_count": 0})).is_empty());
        assert!(items(json!({"items": null})).is_empty());
    }

    #[test]
    fn rate_limit_reset_only_when_exhausted() {
        let mut headers = HeaderMap::new();
        headers.insert("X-RateLimit-Reset", HeaderValue::from_static("1700000000"));
        assert_eq!(rate_limit_reset(&headers), None);

        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("5"));
        assert_eq!(rate_limit_reset(&headers), None);

        headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
        assert_eq!(
            rate_limit_reset(&headers),
            DateTime::<Utc>::from_timestamp(1_700_000_000, 0)
        );

        headers.insert("X-RateLimit-Reset", HeaderValue::from_static("soon"));
        assert_eq!(rate_limit_reset(&headers), None);
    }

    #[tokio::test]
    async fn blank_token_is_missing() {
        let mut server = mockito::Server::new_async().await;
        let any_request = server
            .mock("GET", mockito::Matcher::Any)
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let searcher = DependentsSearcher::new(
            SearchConfig::new(Some("   ".to_string())).with_api_base(server.url()),
        )
        .unwrap();

        let err = searcher.fetch("example.com/foo", 20).await.unwrap_err();
        any_request.assert_async().await;
        assert!(matches!(err, DependentsError::MissingToken));
    }
}
