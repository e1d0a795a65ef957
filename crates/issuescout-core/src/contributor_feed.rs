// Contributor profile lookup
use std::sync::Arc;

use tracing::info;

use issuescout_api::{GitHubClient, GitHubError};

use crate::contributions::{build_stats, ContributorStats};
use crate::validate::validate_username;
use crate::{Error, Result};

/// Fetches a user's profile and recent public events and rolls them into
/// contributor stats.
pub struct ContributorTracker {
    client: Arc<GitHubClient>,
}

impl ContributorTracker {
    pub fn new(client: Arc<GitHubClient>) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, username: &str) -> Result<ContributorStats> {
        let username = validate_username(username)?;

        let user = match self.client.get_user(username).await {
            Ok(user) => user,
            Err(GitHubError::NotFound(_)) => {
                return Err(Error::NotFound(format!(
                    "GitHub user \"{}\" not found",
                    username
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let events = self.client.user_events(username, 100).await?;
        info!(username, events = events.len(), "building contributor stats");

        Ok(build_stats(&user, &events, chrono::Utc::now()))
    }
}
