use chrono::{DateTime, Utc};
use issuescout_api::SearchIssue;
use serde::{Deserialize, Serialize};

/// Issue model - the star of the show
///
/// Built from the wire type at the API boundary. Anything missing the
/// fields we rely on gets skipped there, so downstream code never has
/// to second-guess an `Option` that shouldn't be one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub state: IssueState,
    pub labels: Vec<Label>,
    pub html_url: String,
    pub repository_url: String,
    pub comments: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Someone already claimed this issue
    pub assigned: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// A GitHub label: free-text name plus a color
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: Option<String>,
}

impl Label {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            color: None,
        }
    }
}

impl Issue {
    /// Convert a wire issue into the domain model.
    ///
    /// Fails closed: items missing id, title, state, or created_at are
    /// dropped, as are pull requests masquerading as issues (the search
    /// endpoint returns both).
    pub fn from_wire(wire: SearchIssue) -> Option<Self> {
        if wire.pull_request.is_some() || wire.html_url.contains("/pull/") {
            return None;
        }

        let state = match wire.state.as_deref() {
            Some("open") => IssueState::Open,
            Some("closed") => IssueState::Closed,
            _ => return None,
        };

        let assigned = wire.assignee.is_some() || !wire.assignees.is_empty();

        // Unnamed labels are useless to every classifier downstream
        let labels = wire
            .labels
            .into_iter()
            .filter_map(|l| {
                l.name.map(|name| Label {
                    name,
                    color: l.color,
                })
            })
            .collect();

        Some(Self {
            id: wire.id?,
            number: wire.number,
            title: wire.title?,
            body: wire.body,
            state,
            labels,
            html_url: wire.html_url,
            repository_url: wire.repository_url,
            comments: wire.comments,
            created_at: wire.created_at?,
            updated_at: wire.updated_at,
            assigned,
        })
    }

    pub fn is_open(&self) -> bool {
        self.state == IssueState::Open
    }

    /// "owner/repo" pulled out of the repository API URL
    pub fn repo_full_name(&self) -> Option<String> {
        let mut segments = self.repository_url.rsplit('/');
        let repo = segments.next()?;
        let owner = segments.next()?;
        if owner.is_empty() || repo.is_empty() {
            return None;
        }
        Some(format!("{}/{}", owner, repo))
    }

    /// Just the repository name, without the owner
    pub fn repo_name(&self) -> Option<&str> {
        self.repository_url.rsplit('/').next().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuescout_api::{SearchIssue, WireLabel};

    fn wire_issue() -> SearchIssue {
        serde_json::from_str(
            r#"{
                "id": 1,
                "number": 10,
                "title": "Broken build",
                "state": "open",
                "html_url": "https://github.com/o/r/issues/10",
                "repository_url": "https://api.github.com/repos/o/r",
                "created_at": "2025-08-01T00:00:00Z"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn converts_a_well_formed_issue() {
        let issue = Issue::from_wire(wire_issue()).unwrap();
        assert_eq!(issue.id, 1);
        assert!(issue.is_open());
        assert!(!issue.assigned);
        assert_eq!(issue.repo_full_name().as_deref(), Some("o/r"));
        assert_eq!(issue.repo_name(), Some("r"));
    }

    #[test]
    fn skips_pull_requests() {
        let mut wire = wire_issue();
        wire.pull_request = Some(serde_json::json!({"url": "x"}));
        assert!(Issue::from_wire(wire).is_none());

        let mut wire = wire_issue();
        wire.html_url = "https://github.com/o/r/pull/10".into();
        assert!(Issue::from_wire(wire).is_none());
    }

    #[test]
    fn skips_items_missing_required_fields() {
        let mut wire = wire_issue();
        wire.id = None;
        assert!(Issue::from_wire(wire).is_none());

        let mut wire = wire_issue();
        wire.title = None;
        assert!(Issue::from_wire(wire).is_none());

        let mut wire = wire_issue();
        wire.created_at = None;
        assert!(Issue::from_wire(wire).is_none());

        let mut wire = wire_issue();
        wire.state = Some("weird".into());
        assert!(Issue::from_wire(wire).is_none());
    }

    #[test]
    fn assignee_presence_marks_issue_claimed() {
        let mut wire = wire_issue();
        wire.assignee = Some(serde_json::json!({"login": "someone"}));
        assert!(Issue::from_wire(wire).unwrap().assigned);

        let mut wire = wire_issue();
        wire.assignees = vec![serde_json::json!({"login": "someone"})];
        assert!(Issue::from_wire(wire).unwrap().assigned);
    }

    #[test]
    fn drops_unnamed_labels() {
        let mut wire = wire_issue();
        wire.labels = vec![
            WireLabel {
                name: Some("bug".into()),
                color: Some("d73a4a".into()),
            },
            WireLabel {
                name: None,
                color: None,
            },
        ];
        let issue = Issue::from_wire(wire).unwrap();
        assert_eq!(issue.labels.len(), 1);
        assert_eq!(issue.labels[0].name, "bug");
    }
}
