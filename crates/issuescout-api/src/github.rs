// GitHub REST/Search API client
//
// Everything goes through unauthenticated endpoints by default, so the
// client is deliberately gentle: retries only where it helps, and rate
// limit responses are surfaced as their own error variant so callers
// can apply a cooldown instead of hammering the API.
use std::collections::HashMap;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::models::{Event, Repo, SearchIssuesResponse, User};
use crate::retry::{is_retryable_status, with_retry, RetryConfig};

const GITHUB_API_BASE: &str = "https://api.github.com";

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authentication required")]
    AuthRequired,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

impl GitHubError {
    /// Retry only where a second attempt can plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            GitHubError::RequestFailed { status, .. } => reqwest::StatusCode::from_u16(*status)
                .map(is_retryable_status)
                .unwrap_or(false),
            GitHubError::NetworkError(_) => true,
            GitHubError::RateLimited
            | GitHubError::NotFound(_)
            | GitHubError::AuthRequired
            | GitHubError::ParseError(_) => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitHubError>;

#[derive(Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
    retry_config: RetryConfig,
}

impl GitHubClient {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base_url(token, GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise (or a test server)
    pub fn with_base_url(token: Option<String>, base_url: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static("IssueScout/0.1.0"),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            token,
            base_url,
            retry_config: RetryConfig::default(),
        }
    }

    /// Create client with custom retry configuration
    pub fn with_retry_config(token: Option<String>, retry_config: RetryConfig) -> Self {
        let mut client = Self::new(token);
        client.retry_config = retry_config;
        client
    }

    /// Search for issues: `GET /search/issues?q=...&sort=created&order=desc`
    pub async fn search_issues(&self, query: &str, per_page: u32) -> Result<SearchIssuesResponse> {
        let url = format!("{}/search/issues", self.base_url);
        self.get_json(
            &url,
            &[
                ("q", query.to_string()),
                ("per_page", per_page.to_string()),
                ("sort", "created".to_string()),
                ("order", "desc".to_string()),
            ],
        )
        .await
    }

    /// `GET /users/{username}`
    pub async fn get_user(&self, username: &str) -> Result<User> {
        let url = format!(
            "{}/users/{}",
            self.base_url,
            urlencoding::encode(username)
        );
        self.get_json(&url, &[]).await
    }

    /// `GET /users/{username}/events/public`
    pub async fn user_events(&self, username: &str, per_page: u32) -> Result<Vec<Event>> {
        let url = format!(
            "{}/users/{}/events/public",
            self.base_url,
            urlencoding::encode(username)
        );
        self.get_json(&url, &[("per_page", per_page.to_string())])
            .await
    }

    /// `GET /users/{username}/repos`, most recently updated first
    pub async fn user_repos(&self, username: &str, per_page: u32) -> Result<Vec<Repo>> {
        let url = format!(
            "{}/users/{}/repos",
            self.base_url,
            urlencoding::encode(username)
        );
        self.get_json(
            &url,
            &[
                ("per_page", per_page.to_string()),
                ("sort", "updated".to_string()),
            ],
        )
        .await
    }

    /// `GET /repos/{owner}/{repo}/languages` - byte counts keyed by language
    pub async fn repo_languages(&self, owner: &str, repo: &str) -> Result<HashMap<String, u64>> {
        let url = format!(
            "{}/repos/{}/{}/languages",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(repo)
        );
        self.get_json(&url, &[]).await
    }

    /// `GET /events` - the global public timeline
    pub async fn public_events(&self) -> Result<Vec<Event>> {
        let url = format!("{}/events", self.base_url);
        self.get_json(&url, &[]).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        with_retry(&self.retry_config, GitHubError::is_retryable, || async {
            let mut request = self.client.get(url).query(query);

            if let Some(ref token) = self.token {
                request = request.bearer_auth(token);
            }

            let response = request.send().await?;
            let status = response.status();

            // GitHub signals search rate limiting with 403 for
            // unauthenticated callers, and 429 elsewhere
            if status == reqwest::StatusCode::FORBIDDEN
                || status == reqwest::StatusCode::TOO_MANY_REQUESTS
            {
                return Err(GitHubError::RateLimited);
            }

            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(GitHubError::NotFound(url.to_string()));
            }

            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(GitHubError::AuthRequired);
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(GitHubError::RequestFailed {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                });
            }

            let value: T = response.json().await?;
            Ok(value)
        })
        .await
    }
}
