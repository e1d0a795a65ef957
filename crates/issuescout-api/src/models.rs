use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response envelope from `GET /search/issues`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIssuesResponse {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
    #[serde(default)]
    pub items: Vec<SearchIssue>,
}

/// Issue as GitHub sends it back from the search endpoint
///
/// Everything here is `default`/`Option` on purpose: the search API is
/// duck-typed in practice and we'd rather skip a malformed item at the
/// conversion boundary than fail the whole page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIssue {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub labels: Vec<WireLabel>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub repository_url: String,
    #[serde(default)]
    pub comments: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Presence means someone already claimed the issue
    #[serde(default)]
    pub assignee: Option<serde_json::Value>,
    #[serde(default)]
    pub assignees: Vec<serde_json::Value>,
    /// Presence means this "issue" is really a pull request
    #[serde(default)]
    pub pull_request: Option<serde_json::Value>,
}

/// Label on an issue - GitHub occasionally omits the name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireLabel {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// User from `GET /users/{username}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub public_repos: u32,
}

/// Repository summary from `GET /users/{username}/repos`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub full_name: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Event from `GET /events` or `GET /users/{username}/events/public`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub actor: Option<EventActor>,
    #[serde(default)]
    pub repo: Option<EventRepo>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub payload: EventPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventActor {
    pub login: String,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRepo {
    pub name: String,
}

/// Event payload - shape varies wildly per event type, so everything
/// is optional and unknown fields are ignored
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<PayloadIssue>,
    #[serde(default)]
    pub pull_request: Option<PayloadPullRequest>,
    #[serde(default)]
    pub commits: Vec<PayloadCommit>,
    #[serde(default)]
    pub head: Option<String>,
    #[serde(default, rename = "ref")]
    pub git_ref: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadIssue {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub labels: Vec<WireLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadPullRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub number: u64,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub additions: u32,
    #[serde(default)]
    pub deletions: u32,
    #[serde(default)]
    pub comments: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayloadCommit {
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_issue_parses_with_missing_optionals() {
        let json = r#"{
            "id": 42,
            "number": 7,
            "title": "Fix the thing",
            "state": "open",
            "labels": [{"name": "bug", "color": "d73a4a"}, {}],
            "html_url": "https://github.com/o/r/issues/7",
            "repository_url": "https://api.github.com/repos/o/r",
            "created_at": "2025-08-01T12:00:00Z"
        }"#;

        let issue: SearchIssue = serde_json::from_str(json).unwrap();
        assert_eq!(issue.id, Some(42));
        assert_eq!(issue.title.as_deref(), Some("Fix the thing"));
        assert!(issue.body.is_none());
        assert!(issue.updated_at.is_none());
        assert_eq!(issue.labels.len(), 2);
        assert!(issue.labels[1].name.is_none());
        assert!(issue.pull_request.is_none());
    }

    #[test]
    fn search_response_defaults_empty_items() {
        let json = r#"{"total_count": 0, "incomplete_results": false}"#;
        let resp: SearchIssuesResponse = serde_json::from_str(json).unwrap();
        assert!(resp.items.is_empty());
    }

    #[test]
    fn event_parses_push_payload() {
        let json = r#"{
            "id": "123456",
            "type": "PushEvent",
            "actor": {"login": "octocat", "avatar_url": ""},
            "repo": {"name": "octo/repo"},
            "created_at": "2025-08-20T08:30:00Z",
            "payload": {
                "head": "abc123",
                "ref": "refs/heads/main",
                "commits": [{"message": "initial commit"}]
            }
        }"#;

        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.event_type, "PushEvent");
        assert_eq!(event.payload.commits[0].message, "initial commit");
        assert_eq!(event.payload.git_ref.as_deref(), Some("refs/heads/main"));
    }
}
