// Cache-first issue search
//
// Wraps an IssueSource with the in-memory request cache so repeated
// identical queries inside the TTL never hit the API.
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use issuescout_cache::RequestCache;

use crate::models::Issue;
use crate::query::FilterSelection;
use crate::source::IssueSource;
use crate::Result;

/// What a search produced, and whether the cache served it
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub issues: Vec<Issue>,
    pub total_count: u64,
    pub incomplete_results: bool,
    pub from_cache: bool,
}

#[derive(Serialize, Deserialize)]
struct CachedPage {
    issues: Vec<Issue>,
    total_count: u64,
    incomplete_results: bool,
}

pub struct IssueSearch {
    source: Box<dyn IssueSource>,
    cache: Arc<RequestCache>,
    per_page: u32,
}

impl IssueSearch {
    pub fn new(source: Box<dyn IssueSource>, cache: Arc<RequestCache>, per_page: u32) -> Self {
        Self {
            source,
            cache,
            per_page,
        }
    }

    /// Build the query from a filter selection and search with it
    pub async fn search_with_filters(&self, selection: &FilterSelection) -> Result<SearchOutcome> {
        self.search(&selection.build()).await
    }

    /// Run a search, cache-first. Only open, unassigned issues survive;
    /// the query already asks for those, but search results lag the
    /// issue state by a few minutes.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let cache_key = format!("search:{}:{}", self.per_page, query);

        if let Some(page) = self.cache.get::<CachedPage>(&cache_key) {
            debug!(query, "search cache hit");
            return Ok(SearchOutcome {
                issues: page.issues,
                total_count: page.total_count,
                incomplete_results: page.incomplete_results,
                from_cache: true,
            });
        }

        debug!(query, "search cache miss, querying API");
        let page = self.source.search_issues(query, self.per_page).await?;

        let issues: Vec<Issue> = page
            .issues
            .into_iter()
            .filter(|i| i.is_open() && !i.assigned)
            .collect();

        info!(query, count = issues.len(), "search returned");

        let cached = CachedPage {
            issues: issues.clone(),
            total_count: page.total_count,
            incomplete_results: page.incomplete_results,
        };
        if let Err(e) = self.cache.set(&cache_key, &cached) {
            // A failed cache write costs us a future hit, nothing more
            debug!(error = %e, "failed to cache search results");
        }

        Ok(SearchOutcome {
            issues,
            total_count: cached.total_count,
            incomplete_results: cached.incomplete_results,
            from_cache: false,
        })
    }

    /// Drop any cached pages whose key contains `pattern`
    pub fn invalidate(&self, pattern: Option<&str>) {
        self.cache.invalidate(pattern);
    }
}
