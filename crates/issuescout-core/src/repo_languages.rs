// Repository language lookup with persistent caching
//
// Issues only carry a repository API URL, so showing "Rust, Python" next
// to a result means an extra request per repository. The SQLite store
// keeps that to one request per repo per day.
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use issuescout_api::{GitHubClient, GitHubError};
use issuescout_cache::LanguageStore;

/// Top languages worth showing per repository
const TOP_LANGUAGES: usize = 3;

pub struct RepoLanguages {
    client: Arc<GitHubClient>,
    // rusqlite connections aren't Sync, so the store lives behind a lock
    store: Mutex<LanguageStore>,
}

/// Pull "owner/repo" out of a repository API URL
pub fn parse_repo_url(repository_url: &str) -> Option<(&str, &str)> {
    let path = repository_url.strip_prefix("https://api.github.com/repos/")?;
    let (owner, repo) = path.split_once('/')?;
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return None;
    }
    Some((owner, repo))
}

impl RepoLanguages {
    pub fn new(client: Arc<GitHubClient>, store: LanguageStore) -> Self {
        Self {
            client,
            store: Mutex::new(store),
        }
    }

    /// Top languages for the repository behind an issue's API URL.
    ///
    /// Best-effort by design: an unparseable URL, a failed request, or a
    /// broken cache all come back as an empty list, never an error. The
    /// language chips are decoration, not data anyone depends on.
    pub async fn languages_for(&self, repository_url: &str) -> Vec<String> {
        let Some((owner, repo)) = parse_repo_url(repository_url) else {
            return vec![];
        };
        let full_name = format!("{}/{}", owner, repo);

        match self.store.lock().expect("store lock poisoned").get(&full_name) {
            Ok(Some(languages)) => {
                debug!(repo = %full_name, "language cache hit");
                return languages;
            }
            Ok(None) => {}
            Err(e) => debug!(repo = %full_name, error = %e, "language cache read failed"),
        }

        let languages = match self.client.repo_languages(owner, repo).await {
            Ok(bytes_by_language) => {
                let mut ranked: Vec<(String, u64)> = bytes_by_language.into_iter().collect();
                ranked.sort_by(|a, b| b.1.cmp(&a.1));
                ranked
                    .into_iter()
                    .take(TOP_LANGUAGES)
                    .map(|(language, _)| language)
                    .collect()
            }
            Err(GitHubError::NotFound(_)) | Err(GitHubError::RateLimited) => {
                // Cache the empty answer so a missing or throttled repo
                // doesn't get retried on every render
                vec![]
            }
            Err(e) => {
                warn!(repo = %full_name, error = %e, "language fetch failed");
                return vec![];
            }
        };

        if let Err(e) = self
            .store
            .lock()
            .expect("store lock poisoned")
            .set(&full_name, &languages)
        {
            debug!(repo = %full_name, error = %e, "language cache write failed");
        }

        languages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_repo_urls() {
        assert_eq!(
            parse_repo_url("https://api.github.com/repos/rust-lang/rust"),
            Some(("rust-lang", "rust"))
        );
    }

    #[test]
    fn rejects_malformed_urls() {
        assert_eq!(parse_repo_url(""), None);
        assert_eq!(parse_repo_url("https://github.com/rust-lang/rust"), None);
        assert_eq!(parse_repo_url("https://api.github.com/repos/"), None);
        assert_eq!(parse_repo_url("https://api.github.com/repos/onlyowner"), None);
        assert_eq!(
            parse_repo_url("https://api.github.com/repos/a/b/issues/1"),
            None
        );
    }
}
