// Live activity feed from the public events firehose
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use issuescout_api::models::Event;
use issuescout_api::GitHubClient;

use crate::Result;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Push,
    Issue,
    PullRequest,
    Create,
}

/// One row in the live feed
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: String,
    pub actor: String,
    pub avatar_url: String,
    pub repo: String,
    pub repo_url: String,
    pub kind: ActivityKind,
    /// "opened", "closed", "pushed to", ...
    pub action: String,
    pub created_at: DateTime<Utc>,
    pub title: Option<String>,
    pub url: Option<String>,
}

/// Turn raw events into feed rows. Only the four interesting event types
/// survive; the firehose is mostly watch and fork noise.
pub fn activities_from_events(events: &[Event], limit: usize) -> Vec<Activity> {
    events
        .iter()
        // Take a generous slice before filtering so a noisy page still
        // fills the feed
        .take(limit * 2)
        .filter_map(activity_from_event)
        .take(limit)
        .collect()
}

fn activity_from_event(event: &Event) -> Option<Activity> {
    let actor = event.actor.as_ref()?;
    let repo = event.repo.as_ref()?;

    let (kind, action, title, url) = match event.event_type.as_str() {
        "PushEvent" => {
            let title = match event.payload.commits.len() {
                0 => None,
                1 => Some(event.payload.commits[0].message.clone()),
                n => Some(format!("{} commits", n)),
            };
            (ActivityKind::Push, "pushed to".to_string(), title, None)
        }
        "IssuesEvent" => {
            let issue = event.payload.issue.as_ref()?;
            let action = event.payload.action.clone().unwrap_or_default();
            (
                ActivityKind::Issue,
                format!("{} an issue in", action),
                issue.title.clone(),
                Some(issue.html_url.clone()),
            )
        }
        "PullRequestEvent" => {
            let pr = event.payload.pull_request.as_ref()?;
            let action = match event.payload.action.as_deref() {
                Some("closed") if pr.merged => "merged".to_string(),
                Some(other) => other.to_string(),
                None => String::new(),
            };
            (
                ActivityKind::PullRequest,
                format!("{} a pull request in", action),
                pr.title.clone(),
                Some(pr.html_url.clone()),
            )
        }
        "CreateEvent" => {
            let what = event.payload.git_ref.clone();
            (ActivityKind::Create, "created".to_string(), what, None)
        }
        _ => return None,
    };

    Some(Activity {
        id: event.id.clone(),
        actor: actor.login.clone(),
        avatar_url: actor.avatar_url.clone(),
        repo: repo.name.clone(),
        repo_url: format!("https://github.com/{}", repo.name),
        kind,
        action,
        created_at: event.created_at,
        title,
        url,
    })
}

struct LiveState {
    activities: Vec<Activity>,
    last_fetch: Option<Instant>,
}

/// Polls `GET /events` and keeps the latest batch of activities.
/// Refreshes closer together than `min_interval` are coalesced into the
/// cached batch, since the firehose endpoint is heavily rate limited.
pub struct LiveFeed {
    client: Arc<GitHubClient>,
    limit: usize,
    min_interval: Duration,
    state: Mutex<LiveState>,
}

impl LiveFeed {
    pub fn new(client: Arc<GitHubClient>, limit: usize) -> Self {
        Self {
            client,
            limit,
            min_interval: Duration::from_secs(30),
            state: Mutex::new(LiveState {
                activities: Vec::new(),
                last_fetch: None,
            }),
        }
    }

    pub fn activities(&self) -> Vec<Activity> {
        self.state
            .lock()
            .expect("feed lock poisoned")
            .activities
            .clone()
    }

    pub async fn refresh(&self) -> Result<Vec<Activity>> {
        {
            let state = self.state.lock().expect("feed lock poisoned");
            if let Some(last) = state.last_fetch {
                if last.elapsed() < self.min_interval {
                    debug!("live feed refresh throttled, serving cached batch");
                    return Ok(state.activities.clone());
                }
            }
        }

        let events = self.client.public_events().await?;
        let activities = activities_from_events(&events, self.limit);

        let mut state = self.state.lock().expect("feed lock poisoned");
        state.activities = activities.clone();
        state.last_fetch = Some(Instant::now());
        Ok(activities)
    }
}
