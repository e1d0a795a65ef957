// The bounty feed orchestrator
//
// Cycles through the fixed bounty queries sequentially (the search API
// rate-limits aggressively when unauthenticated), verifies that results
// actually advertise a reward, and maintains a bounded, deduplicated
// feed across refreshes.
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use issuescout_api::{run_sequential, ScheduleConfig};

use crate::bounty::{bounty_queries, is_bounty_issue};
use crate::models::Issue;
use crate::source::IssueSource;
use crate::{Error, Result};

#[derive(Debug, Clone)]
pub struct BountyFeedConfig {
    pub per_page: u32,
    /// Feed never grows past this many items
    pub capacity: usize,
    pub schedule: ScheduleConfig,
}

impl Default for BountyFeedConfig {
    fn default() -> Self {
        Self {
            per_page: 30,
            capacity: 30,
            schedule: ScheduleConfig::default(),
        }
    }
}

/// What one refresh did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    pub new_items: usize,
    pub total: usize,
    /// Verification found nothing, so unverified open issues were kept
    pub fallback_used: bool,
    /// A newer refresh started while this one ran; its results were
    /// discarded
    pub superseded: bool,
}

struct FeedState {
    items: Vec<Issue>,
    /// Every issue id ever shown, so silent refreshes only surface news
    seen_ids: HashSet<u64>,
    last_refresh: Option<DateTime<Utc>>,
}

pub struct BountyFeed {
    source: Box<dyn IssueSource>,
    config: BountyFeedConfig,
    state: Mutex<FeedState>,
    /// Refresh generation counter; a stale refresh discovers it has been
    /// superseded by comparing against this after its queries finish
    generation: AtomicU64,
}

impl BountyFeed {
    pub fn new(source: Box<dyn IssueSource>, config: BountyFeedConfig) -> Self {
        Self {
            source,
            config,
            state: Mutex::new(FeedState {
                items: Vec::new(),
                seen_ids: HashSet::new(),
                last_refresh: None,
            }),
            generation: AtomicU64::new(0),
        }
    }

    pub fn items(&self) -> Vec<Issue> {
        self.state.lock().expect("feed lock poisoned").items.clone()
    }

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        self.state.lock().expect("feed lock poisoned").last_refresh
    }

    /// Refresh the feed. A silent refresh keeps the current items on
    /// screen and only merges in new ones; a loud refresh clears first.
    pub async fn refresh(&self, silent: bool) -> Result<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let known_ids = {
            let mut state = self.state.lock().expect("feed lock poisoned");
            if !silent {
                state.items.clear();
            }
            state.seen_ids.clone()
        };

        let queries = bounty_queries();
        let per_page = self.config.per_page;
        let source = &self.source;
        let outcomes = run_sequential(
            &self.config.schedule,
            &queries,
            Error::is_rate_limited,
            |query| async move { source.search_issues(&query, per_page).await },
        )
        .await;

        let success_count = outcomes.iter().filter(|o| o.succeeded()).count();

        let mut batch_ids = HashSet::new();
        let mut candidates = Vec::new();
        for outcome in outcomes {
            match outcome.result {
                Ok(page) => {
                    for issue in page.issues {
                        if known_ids.contains(&issue.id) || !batch_ids.insert(issue.id) {
                            continue;
                        }
                        if issue.is_open() && !issue.assigned {
                            candidates.push(issue);
                        }
                    }
                }
                Err(e) => {
                    warn!(query = %outcome.query, error = %e, "bounty query failed");
                }
            }
        }

        let mut fallback_used = false;
        let mut verified: Vec<Issue> = candidates
            .iter()
            .filter(|i| is_bounty_issue(i))
            .cloned()
            .collect();

        if verified.is_empty() && !candidates.is_empty() {
            // The queries matched but nothing passed verification. Showing
            // the unverified results beats showing an empty feed.
            warn!(
                count = candidates.len(),
                "no issues passed bounty verification, keeping unverified results"
            );
            verified = candidates;
            fallback_used = true;
        }

        let mut state = self.state.lock().expect("feed lock poisoned");

        if self.generation.load(Ordering::SeqCst) != generation {
            info!("bounty refresh superseded by a newer one, discarding results");
            return Ok(RefreshOutcome {
                new_items: 0,
                total: state.items.len(),
                fallback_used: false,
                superseded: true,
            });
        }

        if success_count == 0 && verified.is_empty() {
            if state.items.is_empty() && !silent {
                return Err(Error::ApiError(
                    "All bounty queries failed and no previous results are available".to_string(),
                ));
            }
            // Keep showing what we have; this refresh just found nothing
            return Ok(RefreshOutcome {
                new_items: 0,
                total: state.items.len(),
                fallback_used: false,
                superseded: false,
            });
        }

        let new_items = verified.len();
        for issue in &verified {
            state.seen_ids.insert(issue.id);
        }

        // Retained items get re-checked too: an issue can lose its bounty
        // label between refreshes
        let mut merged = verified;
        merged.extend(state.items.drain(..).filter(|i| is_bounty_issue(i)));
        merged.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        merged.truncate(self.config.capacity);

        info!(new = new_items, total = merged.len(), "bounty feed refreshed");

        state.items = merged;
        state.last_refresh = Some(Utc::now());

        Ok(RefreshOutcome {
            new_items,
            total: state.items.len(),
            fallback_used,
            superseded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IssueState, Label};
    use crate::source::{MockIssueSource, SearchPage};
    use chrono::Duration;

    fn fast_config() -> BountyFeedConfig {
        BountyFeedConfig {
            per_page: 30,
            capacity: 30,
            schedule: ScheduleConfig {
                inter_query_delay_ms: 1,
                rate_limit_cooldown_ms: 1,
            },
        }
    }

    fn issue(id: u64, title: &str, labels: &[&str]) -> Issue {
        Issue {
            id,
            number: id,
            title: title.to_string(),
            body: None,
            state: IssueState::Open,
            labels: labels.iter().map(|n| Label::new(n)).collect(),
            html_url: String::new(),
            repository_url: String::new(),
            comments: 0,
            created_at: Utc::now() - Duration::minutes(id as i64),
            updated_at: None,
            assigned: false,
        }
    }

    fn page(issues: Vec<Issue>) -> SearchPage {
        SearchPage {
            total_count: issues.len() as u64,
            incomplete_results: false,
            issues,
        }
    }

    #[tokio::test]
    async fn collects_and_dedups_across_queries() {
        let mut source = MockIssueSource::new();
        // Every query returns the same two issues; only one copy of each
        // may survive
        source.expect_search_issues().times(6).returning(|_, _| {
            Ok(page(vec![
                issue(1, "Fix parser", &["bounty"]),
                issue(2, "$100 reward for docs fix", &[]),
            ]))
        });

        let feed = BountyFeed::new(Box::new(source), fast_config());
        let outcome = feed.refresh(false).await.unwrap();

        assert_eq!(outcome.new_items, 2);
        assert_eq!(outcome.total, 2);
        assert!(!outcome.fallback_used);
        assert!(!outcome.superseded);
        assert_eq!(feed.items().len(), 2);
    }

    #[tokio::test]
    async fn unverified_results_fall_back_instead_of_empty() {
        let mut source = MockIssueSource::new();
        source
            .expect_search_issues()
            .times(6)
            .returning(|_, _| Ok(page(vec![issue(1, "Plain old bug", &["bug"])])));

        let feed = BountyFeed::new(Box::new(source), fast_config());
        let outcome = feed.refresh(false).await.unwrap();

        assert!(outcome.fallback_used);
        assert_eq!(outcome.total, 1);
    }

    #[tokio::test]
    async fn total_failure_with_empty_feed_is_an_error() {
        let mut source = MockIssueSource::new();
        source
            .expect_search_issues()
            .times(6)
            .returning(|_, _| Err(Error::RateLimited));

        let feed = BountyFeed::new(Box::new(source), fast_config());
        assert!(feed.refresh(false).await.is_err());
    }

    #[tokio::test]
    async fn partial_failure_is_not_an_error() {
        let mut source = MockIssueSource::new();
        let calls = std::sync::atomic::AtomicU32::new(0);
        source.expect_search_issues().times(6).returning(move |_, _| {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(page(vec![issue(1, "bounty: fix this", &[])]))
            } else {
                Err(Error::RateLimited)
            }
        });

        let feed = BountyFeed::new(Box::new(source), fast_config());
        let outcome = feed.refresh(false).await.unwrap();
        assert_eq!(outcome.total, 1);
    }

    #[tokio::test]
    async fn silent_refresh_only_surfaces_new_issues() {
        let mut source = MockIssueSource::new();
        let calls = std::sync::atomic::AtomicU32::new(0);
        source.expect_search_issues().times(12).returning(move |_, _| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            if n < 6 {
                Ok(page(vec![issue(1, "Fix parser", &["bounty"])]))
            } else {
                Ok(page(vec![
                    issue(1, "Fix parser", &["bounty"]),
                    issue(2, "New bounty issue", &["bounty"]),
                ]))
            }
        });

        let feed = BountyFeed::new(Box::new(source), fast_config());
        feed.refresh(false).await.unwrap();

        let second = feed.refresh(true).await.unwrap();
        assert_eq!(second.new_items, 1);
        assert_eq!(second.total, 2);
    }

    #[tokio::test]
    async fn failed_silent_refresh_keeps_existing_items() {
        let mut source = MockIssueSource::new();
        let calls = std::sync::atomic::AtomicU32::new(0);
        source.expect_search_issues().times(12).returning(move |_, _| {
            if calls.fetch_add(1, Ordering::SeqCst) < 6 {
                Ok(page(vec![issue(1, "Fix parser", &["bounty"])]))
            } else {
                Err(Error::RateLimited)
            }
        });

        let feed = BountyFeed::new(Box::new(source), fast_config());
        feed.refresh(false).await.unwrap();

        let outcome = feed.refresh(true).await.unwrap();
        assert_eq!(outcome.new_items, 0);
        assert_eq!(outcome.total, 1);
        assert_eq!(feed.items().len(), 1);
    }

    #[tokio::test]
    async fn feed_is_capped_and_sorted_newest_first() {
        let mut source = MockIssueSource::new();
        source.expect_search_issues().times(6).returning(|query, _| {
            if query.contains("label:bounty") && !query.contains("bountysource") {
                Ok(page((1..=40).map(|i| issue(i, "bounty work", &["bounty"])).collect()))
            } else {
                Ok(page(vec![]))
            }
        });

        let mut config = fast_config();
        config.capacity = 10;
        let feed = BountyFeed::new(Box::new(source), config);
        let outcome = feed.refresh(false).await.unwrap();

        assert_eq!(outcome.total, 10);
        let items = feed.items();
        // created_at descends with ascending id in the fixture
        assert!(items.windows(2).all(|w| w[0].created_at >= w[1].created_at));
    }

    /// Source whose very first call parks until released, so a second
    /// refresh can overtake the first
    struct GatedSource {
        first_call: std::sync::atomic::AtomicBool,
        entered: std::sync::Arc<tokio::sync::Notify>,
        gate: std::sync::Arc<tokio::sync::Notify>,
        phase: std::sync::Arc<AtomicU64>,
    }

    #[async_trait::async_trait]
    impl crate::source::IssueSource for GatedSource {
        async fn search_issues(&self, _query: &str, _per_page: u32) -> crate::Result<SearchPage> {
            if self.first_call.swap(false, Ordering::SeqCst) {
                self.entered.notify_one();
                self.gate.notified().await;
            }
            let id = 1 + self.phase.load(Ordering::SeqCst);
            Ok(page(vec![issue(id, "bounty work", &["bounty"])]))
        }
    }

    #[tokio::test]
    async fn overtaken_refresh_is_discarded() {
        use std::sync::Arc;

        let entered = Arc::new(tokio::sync::Notify::new());
        let gate = Arc::new(tokio::sync::Notify::new());
        let phase = Arc::new(AtomicU64::new(0));

        let source = GatedSource {
            first_call: std::sync::atomic::AtomicBool::new(true),
            entered: entered.clone(),
            gate: gate.clone(),
            phase: phase.clone(),
        };

        let feed = Arc::new(BountyFeed::new(Box::new(source), fast_config()));

        // First refresh parks inside its first query
        let stale = {
            let feed = feed.clone();
            tokio::spawn(async move { feed.refresh(false).await })
        };
        entered.notified().await;

        // Second refresh starts later and finishes first, publishing id 2
        phase.store(1, Ordering::SeqCst);
        let fresh = feed.refresh(false).await.unwrap();
        assert!(!fresh.superseded);
        assert_eq!(fresh.total, 1);

        // Release the first refresh; its results (id 1) must be discarded
        phase.store(0, Ordering::SeqCst);
        gate.notify_one();
        let outcome = stale.await.unwrap().unwrap();

        assert!(outcome.superseded);
        assert_eq!(outcome.new_items, 0);

        let items = feed.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[tokio::test]
    async fn assigned_and_closed_candidates_are_dropped() {
        let mut source = MockIssueSource::new();
        source.expect_search_issues().times(6).returning(|_, _| {
            let mut assigned = issue(1, "bounty: taken", &["bounty"]);
            assigned.assigned = true;
            let mut closed = issue(2, "bounty: done", &["bounty"]);
            closed.state = IssueState::Closed;
            Ok(page(vec![assigned, closed, issue(3, "bounty: open", &["bounty"])]))
        });

        let feed = BountyFeed::new(Box::new(source), fast_config());
        let outcome = feed.refresh(false).await.unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(feed.items()[0].id, 3);
    }
}
