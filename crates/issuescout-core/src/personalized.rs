// Personalized recommendations
//
// Builds a lightweight profile from a user's public repos, then scores a
// generic pool of open unassigned issues against it.
use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use issuescout_api::models::{Repo, User};
use issuescout_api::GitHubClient;

use crate::matcher::{match_issues, IssueMatch, UserProfile};
use crate::source::IssueSource;
use crate::validate::validate_username;
use crate::Result;

/// The generic pool the recommendations are drawn from
const DEFAULT_QUERY: &str = "is:open is:issue no:assignee";
const POOL_SIZE: u32 = 50;

pub struct PersonalizedFeed {
    source: Box<dyn IssueSource>,
    client: Arc<GitHubClient>,
    limit: usize,
}

/// Derive a profile from profile + repo data. Languages come from the
/// twenty most recently updated repos; contribution count is proxied by
/// the public repo count, which is all the unauthenticated API offers.
pub fn profile_from_parts(user: &User, repos: &[Repo]) -> UserProfile {
    let mut seen = HashSet::new();
    let languages: Vec<String> = repos
        .iter()
        .take(20)
        .filter_map(|r| r.language.as_ref())
        .map(|l| l.to_lowercase())
        .filter(|l| seen.insert(l.clone()))
        .collect();

    let repositories = repos.iter().map(|r| r.full_name.clone()).collect();

    UserProfile {
        username: Some(user.login.clone()),
        languages,
        repositories,
        contributions: user.public_repos,
        preferred_topics: vec![],
    }
}

impl PersonalizedFeed {
    pub fn new(source: Box<dyn IssueSource>, client: Arc<GitHubClient>, limit: usize) -> Self {
        Self {
            source,
            client,
            limit,
        }
    }

    /// Fetch what we can learn about a user from their public profile
    pub async fn load_profile(&self, username: &str) -> Result<UserProfile> {
        let username = validate_username(username)?;

        let user = self.client.get_user(username).await?;
        let repos = self.client.user_repos(username, 100).await?;

        let profile = profile_from_parts(&user, &repos);
        info!(
            username,
            languages = profile.languages.len(),
            repos = profile.repositories.len(),
            "profile loaded"
        );
        Ok(profile)
    }

    /// Top recommendations for a profile. Without a profile (or with one
    /// carrying no signal) the pool comes back unscored instead.
    pub async fn recommendations(&self, profile: Option<&UserProfile>) -> Result<Vec<IssueMatch>> {
        let page = self.source.search_issues(DEFAULT_QUERY, POOL_SIZE).await?;

        let issues: Vec<_> = page
            .issues
            .into_iter()
            .filter(|i| i.is_open() && !i.assigned)
            .collect();

        // Even a profile with no repo signal still earns beginner and
        // freshness points; the scorer's own guard handles the truly
        // empty case
        let mut matches = match profile {
            Some(profile) => match_issues(issues, profile),
            None => issues
                .into_iter()
                .map(|issue| IssueMatch {
                    issue,
                    match_score: 0,
                    reasons: vec![],
                })
                .collect(),
        };

        matches.truncate(self.limit);
        Ok(matches)
    }
}
