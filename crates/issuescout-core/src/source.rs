// Issue source abstraction
//
// The feeds and search layers talk to this trait instead of the HTTP
// client directly, so tests can mock the network away.
use async_trait::async_trait;

use issuescout_api::GitHubClient;

use crate::models::Issue;
use crate::Result;

/// One page of search results, already converted to domain issues
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub issues: Vec<Issue>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IssueSource: Send + Sync {
    async fn search_issues(&self, query: &str, per_page: u32) -> Result<SearchPage>;
}

/// The real thing, backed by the GitHub search API
pub struct GitHubIssueSource {
    client: GitHubClient,
}

impl GitHubIssueSource {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IssueSource for GitHubIssueSource {
    async fn search_issues(&self, query: &str, per_page: u32) -> Result<SearchPage> {
        let response = self.client.search_issues(query, per_page).await?;

        // Malformed items and stray pull requests get dropped here, not
        // surfaced as errors
        let issues = response
            .items
            .into_iter()
            .filter_map(Issue::from_wire)
            .collect();

        Ok(SearchPage {
            total_count: response.total_count,
            incomplete_results: response.incomplete_results,
            issues,
        })
    }
}
