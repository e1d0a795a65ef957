// Contributor statistics from the public event stream
//
// GitHub's events API only covers ~90 days of public activity, so every
// number here is "recent activity", not lifetime totals.
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use issuescout_api::models::{Event, User};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContributionKind {
    Issue,
    PullRequest,
    Commit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContributionState {
    Open,
    Closed,
    Merged,
}

/// One unit of activity extracted from an event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contribution {
    pub id: String,
    pub kind: ContributionKind,
    pub repository: String,
    pub title: String,
    pub url: String,
    pub state: ContributionState,
    pub created_at: DateTime<Utc>,
    pub labels: Vec<String>,
    pub additions: u32,
    pub deletions: u32,
    pub comments: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub title: &'static str,
    pub description: String,
    pub icon: &'static str,
    pub rarity: Rarity,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributorStats {
    pub username: String,
    pub avatar_url: String,
    pub html_url: String,
    pub public_repos: u32,
    pub total_contributions: u32,
    pub issues_opened: u32,
    pub issues_closed: u32,
    pub prs_opened: u32,
    pub prs_merged: u32,
    pub commits: u32,
    pub reviews: u32,
    pub repositories: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub impact_score: u8,
    pub achievements: Vec<Achievement>,
    pub timeline: Vec<TimelineDay>,
}

/// Contributions grouped by calendar day, newest first
#[derive(Debug, Clone, Serialize)]
pub struct TimelineDay {
    pub date: NaiveDate,
    pub contributions: Vec<Contribution>,
}

/// Pull the contributions we can attribute out of an event list.
/// Unrecognized event types are skipped.
pub fn contributions_from_events(events: &[Event]) -> Vec<Contribution> {
    let mut contributions = Vec::new();

    for event in events {
        let repository = event
            .repo
            .as_ref()
            .map(|r| r.name.clone())
            .unwrap_or_default();

        match event.event_type.as_str() {
            "IssuesEvent" => {
                let action = event.payload.action.as_deref();
                if !matches!(action, Some("opened") | Some("closed")) {
                    continue;
                }
                let Some(issue) = &event.payload.issue else {
                    continue;
                };
                contributions.push(Contribution {
                    id: event.id.clone(),
                    kind: ContributionKind::Issue,
                    repository,
                    title: issue.title.clone().unwrap_or_default(),
                    url: issue.html_url.clone(),
                    state: if action == Some("closed") {
                        ContributionState::Closed
                    } else {
                        ContributionState::Open
                    },
                    created_at: event.created_at,
                    labels: issue
                        .labels
                        .iter()
                        .filter_map(|l| l.name.clone())
                        .collect(),
                    additions: 0,
                    deletions: 0,
                    comments: 0,
                });
            }
            "PullRequestEvent" => {
                let action = event.payload.action.as_deref();
                if !matches!(action, Some("opened") | Some("closed")) {
                    continue;
                }
                let Some(pr) = &event.payload.pull_request else {
                    continue;
                };
                let state = if action == Some("opened") {
                    ContributionState::Open
                } else if pr.merged {
                    ContributionState::Merged
                } else {
                    ContributionState::Closed
                };
                contributions.push(Contribution {
                    id: event.id.clone(),
                    kind: ContributionKind::PullRequest,
                    repository,
                    title: pr.title.clone().unwrap_or_default(),
                    url: pr.html_url.clone(),
                    state,
                    created_at: event.created_at,
                    labels: vec![],
                    additions: pr.additions,
                    deletions: pr.deletions,
                    comments: pr.comments,
                });
            }
            "PushEvent" => {
                if event.payload.commits.is_empty() {
                    continue;
                }
                let title = match event.payload.commits.len() {
                    1 => event.payload.commits[0].message.clone(),
                    n => format!("Pushed {} commits", n),
                };
                let url = match (&event.repo, &event.payload.head) {
                    (Some(repo), Some(head)) => {
                        format!("https://github.com/{}/commit/{}", repo.name, head)
                    }
                    _ => String::new(),
                };
                contributions.push(Contribution {
                    id: event.id.clone(),
                    kind: ContributionKind::Commit,
                    repository,
                    title,
                    url,
                    state: ContributionState::Closed,
                    created_at: event.created_at,
                    labels: vec![],
                    additions: 0,
                    deletions: 0,
                    comments: 0,
                });
            }
            _ => {}
        }
    }

    contributions
}

/// Current and longest daily streaks from a list of contribution dates.
///
/// The current streak is anchored at `today` or yesterday; activity that
/// stopped two days ago is a streak of zero, however long it ran.
pub fn calculate_streaks(dates: &[NaiveDate], today: NaiveDate) -> (u32, u32) {
    if dates.is_empty() {
        return (0, 0);
    }

    let mut unique: Vec<NaiveDate> = dates.to_vec();
    unique.sort_unstable();
    unique.dedup();

    let mut longest = 1u32;
    let mut run = 1u32;
    for pair in unique.windows(2) {
        if pair[1] - pair[0] == Duration::days(1) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 1;
        }
    }

    let last = *unique.last().expect("non-empty after dedup");
    let mut current = 0u32;
    if today - last <= Duration::days(1) && today >= last {
        current = 1;
        let mut expected = last - Duration::days(1);
        for date in unique.iter().rev().skip(1) {
            if *date == expected {
                current += 1;
                expected = expected - Duration::days(1);
            } else {
                break;
            }
        }
    }

    (current, longest)
}

/// Weighted contribution score, 0-100. Each component caps individually
/// so no single activity type can dominate.
pub fn calculate_impact_score(
    issues_closed: u32,
    prs_merged: u32,
    commits: u32,
    reviews: u32,
    current_streak: u32,
) -> u8 {
    let score = (issues_closed as f64 * 0.5).min(30.0)
        + (prs_merged as f64 * 0.6).min(30.0)
        + (commits as f64 * 0.1).min(20.0)
        + (reviews as f64 * 0.2).min(10.0)
        + (current_streak as f64 * 0.5).min(10.0);

    (score.round() as u64).min(100) as u8
}

fn tiered_rarity(count: u32, epic_at: u32, legendary_at: u32) -> Rarity {
    if count >= legendary_at {
        Rarity::Legendary
    } else if count >= epic_at {
        Rarity::Epic
    } else {
        Rarity::Rare
    }
}

pub fn generate_achievements(
    total_contributions: u32,
    issues_closed: u32,
    prs_merged: u32,
    longest_streak: u32,
    repositories: u32,
) -> Vec<Achievement> {
    let mut achievements = Vec::new();

    if total_contributions >= 1 {
        achievements.push(Achievement {
            id: "first-contribution",
            title: "First Steps",
            description: "Made your first contribution".to_string(),
            icon: "🎉",
            rarity: Rarity::Common,
        });
    }

    if issues_closed >= 10 {
        achievements.push(Achievement {
            id: "bug-hunter",
            title: "Bug Hunter",
            description: format!("Closed {} issues", issues_closed),
            icon: "🐛",
            rarity: tiered_rarity(issues_closed, 50, 100),
        });
    }

    if prs_merged >= 10 {
        achievements.push(Achievement {
            id: "code-contributor",
            title: "Code Contributor",
            description: format!("Merged {} pull requests", prs_merged),
            icon: "🚀",
            rarity: tiered_rarity(prs_merged, 50, 100),
        });
    }

    if longest_streak >= 7 {
        achievements.push(Achievement {
            id: "consistent-contributor",
            title: "Consistent Contributor",
            description: format!("{}-day contribution streak", longest_streak),
            icon: "🔥",
            rarity: tiered_rarity(longest_streak, 100, 365),
        });
    }

    if repositories >= 10 {
        achievements.push(Achievement {
            id: "open-source-explorer",
            title: "Open Source Explorer",
            description: format!("Contributed to {} repositories", repositories),
            icon: "🌍",
            rarity: Rarity::Rare,
        });
    }

    achievements
}

/// Group contributions by calendar day, newest day first. Within a day
/// the original (newest-first) event order is preserved.
pub fn build_timeline(mut contributions: Vec<Contribution>) -> Vec<TimelineDay> {
    contributions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let mut days: Vec<TimelineDay> = Vec::new();
    for contribution in contributions {
        let date = contribution.created_at.date_naive();
        match days.last_mut() {
            Some(day) if day.date == date => day.contributions.push(contribution),
            _ => days.push(TimelineDay {
                date,
                contributions: vec![contribution],
            }),
        }
    }
    days
}

/// Assemble the full stats view for a user from their profile and public
/// events.
pub fn build_stats(user: &User, events: &[Event], now: DateTime<Utc>) -> ContributorStats {
    let contributions = contributions_from_events(events);

    let mut issues_opened = 0;
    let mut issues_closed = 0;
    let mut prs_opened = 0;
    let mut prs_merged = 0;
    let mut commits = 0;
    let mut repos: HashSet<&str> = HashSet::new();

    for c in &contributions {
        if !c.repository.is_empty() {
            repos.insert(c.repository.as_str());
        }
        match (c.kind, c.state) {
            (ContributionKind::Issue, ContributionState::Open) => issues_opened += 1,
            (ContributionKind::Issue, _) => issues_closed += 1,
            (ContributionKind::PullRequest, ContributionState::Merged) => prs_merged += 1,
            (ContributionKind::PullRequest, _) => prs_opened += 1,
            (ContributionKind::Commit, _) => commits += 1,
        }
    }

    let reviews = events
        .iter()
        .filter(|e| e.event_type == "PullRequestReviewEvent")
        .count() as u32;

    let dates: Vec<NaiveDate> = contributions
        .iter()
        .map(|c| c.created_at.date_naive())
        .collect();
    let (current_streak, longest_streak) = calculate_streaks(&dates, now.date_naive());

    let total_contributions = contributions.len() as u32;
    let repositories = repos.len() as u32;
    let impact_score =
        calculate_impact_score(issues_closed, prs_merged, commits, reviews, current_streak);
    let achievements = generate_achievements(
        total_contributions,
        issues_closed,
        prs_merged,
        longest_streak,
        repositories,
    );

    ContributorStats {
        username: user.login.clone(),
        avatar_url: user.avatar_url.clone(),
        html_url: user.html_url.clone(),
        public_repos: user.public_repos,
        total_contributions,
        issues_opened,
        issues_closed,
        prs_opened,
        prs_merged,
        commits,
        reviews,
        repositories,
        current_streak,
        longest_streak,
        impact_score,
        achievements,
        timeline: build_timeline(contributions),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use issuescout_api::models::{EventPayload, EventRepo, PayloadCommit, PayloadIssue, PayloadPullRequest};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn event(id: &str, event_type: &str, days_ago: i64, payload: EventPayload) -> Event {
        Event {
            id: id.to_string(),
            event_type: event_type.to_string(),
            actor: None,
            repo: Some(EventRepo {
                name: "octo/repo".to_string(),
            }),
            created_at: Utc::now() - Duration::days(days_ago),
            payload,
        }
    }

    fn issue_payload(action: &str) -> EventPayload {
        EventPayload {
            action: Some(action.to_string()),
            issue: Some(PayloadIssue {
                title: Some("Crash on save".to_string()),
                number: 1,
                html_url: "https://github.com/octo/repo/issues/1".to_string(),
                created_at: None,
                updated_at: None,
                labels: vec![],
            }),
            ..Default::default()
        }
    }

    fn pr_payload(action: &str, merged: bool) -> EventPayload {
        EventPayload {
            action: Some(action.to_string()),
            pull_request: Some(PayloadPullRequest {
                title: Some("Fix crash".to_string()),
                number: 2,
                html_url: "https://github.com/octo/repo/pull/2".to_string(),
                merged,
                created_at: None,
                updated_at: None,
                additions: 10,
                deletions: 2,
                comments: 1,
            }),
            ..Default::default()
        }
    }

    fn push_payload(messages: &[&str]) -> EventPayload {
        EventPayload {
            head: Some("abc123".to_string()),
            commits: messages
                .iter()
                .map(|m| PayloadCommit {
                    message: m.to_string(),
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn extracts_issues_prs_and_pushes() {
        let events = vec![
            event("1", "IssuesEvent", 0, issue_payload("opened")),
            event("2", "IssuesEvent", 0, issue_payload("labeled")),
            event("3", "PullRequestEvent", 1, pr_payload("closed", true)),
            event("4", "PushEvent", 2, push_payload(&["one", "two"])),
            event("5", "WatchEvent", 2, EventPayload::default()),
        ];

        let contributions = contributions_from_events(&events);
        assert_eq!(contributions.len(), 3);
        assert_eq!(contributions[0].kind, ContributionKind::Issue);
        assert_eq!(contributions[1].state, ContributionState::Merged);
        assert_eq!(contributions[2].title, "Pushed 2 commits");
    }

    #[test]
    fn streaks_need_a_today_or_yesterday_anchor() {
        let today = date(2025, 8, 25);

        // Ran 3 days up to yesterday: current 3
        let dates = [date(2025, 8, 22), date(2025, 8, 23), date(2025, 8, 24)];
        assert_eq!(calculate_streaks(&dates, today), (3, 3));

        // Same run ending two days ago: current 0, longest preserved
        let dates = [date(2025, 8, 21), date(2025, 8, 22), date(2025, 8, 23)];
        assert_eq!(calculate_streaks(&dates, today), (0, 3));
    }

    #[test]
    fn longest_streak_survives_gaps() {
        let today = date(2025, 8, 25);
        let dates = [
            date(2025, 8, 10),
            date(2025, 8, 11),
            date(2025, 8, 12),
            date(2025, 8, 13),
            // gap
            date(2025, 8, 24),
            date(2025, 8, 25),
        ];
        assert_eq!(calculate_streaks(&dates, today), (2, 4));
    }

    #[test]
    fn duplicate_dates_count_once() {
        let today = date(2025, 8, 25);
        let dates = [date(2025, 8, 25), date(2025, 8, 25), date(2025, 8, 24)];
        assert_eq!(calculate_streaks(&dates, today), (2, 2));
    }

    #[test]
    fn impact_score_caps_per_component() {
        // 1000 commits still only contributes 20 points
        assert_eq!(calculate_impact_score(0, 0, 1000, 0, 0), 20);
        // Everything maxed lands exactly at 100
        assert_eq!(calculate_impact_score(60, 50, 200, 50, 20), 100);
        assert_eq!(calculate_impact_score(0, 0, 0, 0, 0), 0);
        // 4 closed issues round to 2
        assert_eq!(calculate_impact_score(4, 0, 0, 0, 0), 2);
    }

    #[test]
    fn achievements_track_thresholds() {
        let none = generate_achievements(0, 0, 0, 0, 0);
        assert!(none.is_empty());

        let some = generate_achievements(5, 12, 3, 8, 2);
        let ids: Vec<&str> = some.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["first-contribution", "bug-hunter", "consistent-contributor"]);
        assert_eq!(some[1].rarity, Rarity::Rare);

        let epic = generate_achievements(100, 60, 0, 0, 0);
        assert_eq!(epic[1].rarity, Rarity::Epic);
    }

    #[test]
    fn timeline_groups_by_day_newest_first() {
        let events = vec![
            event("1", "IssuesEvent", 3, issue_payload("opened")),
            event("2", "PushEvent", 0, push_payload(&["fix"])),
            event("3", "IssuesEvent", 0, issue_payload("closed")),
        ];

        let timeline = build_timeline(contributions_from_events(&events));
        assert_eq!(timeline.len(), 2);
        assert_eq!(timeline[0].contributions.len(), 2);
        assert_eq!(timeline[1].contributions.len(), 1);
        assert!(timeline[0].date > timeline[1].date);
    }

    #[test]
    fn stats_roll_everything_up() {
        let user = User {
            login: "octocat".to_string(),
            avatar_url: "https://avatars.example/1".to_string(),
            html_url: "https://github.com/octocat".to_string(),
            public_repos: 8,
        };
        let events = vec![
            event("1", "IssuesEvent", 0, issue_payload("closed")),
            event("2", "PullRequestEvent", 0, pr_payload("closed", true)),
            event("3", "PushEvent", 1, push_payload(&["fix"])),
            event("4", "PullRequestReviewEvent", 1, EventPayload::default()),
        ];

        let stats = build_stats(&user, &events, Utc::now());
        assert_eq!(stats.total_contributions, 3);
        assert_eq!(stats.issues_closed, 1);
        assert_eq!(stats.prs_merged, 1);
        assert_eq!(stats.commits, 1);
        assert_eq!(stats.reviews, 1);
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.repositories, 1);
        assert!(stats
            .achievements
            .iter()
            .any(|a| a.id == "first-contribution"));
    }
}
