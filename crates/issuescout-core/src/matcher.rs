// Profile-based match scoring
//
// Scores how well an issue fits a user's languages, followed repos, and
// topics. Weights: 40 for languages, 20 for repos, 20 for topics, 10 for
// the beginner bonus, 10 for freshness, capped at 100.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::difficulty::has_beginner_label;
use crate::models::Issue;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: Option<String>,
    /// Programming languages, lowercase
    pub languages: Vec<String>,
    /// Full names ("owner/repo") of repositories the user follows
    pub repositories: Vec<String>,
    /// Rough contribution count; below 5 counts as a new contributor
    pub contributions: u32,
    pub preferred_topics: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssueMatch {
    pub issue: Issue,
    pub match_score: u8,
    /// Human-readable reasons the score came out this way
    pub reasons: Vec<String>,
}

/// Per-language keywords to look for in issue text. A bare language name
/// misses most real issues ("Add React hook support" never says
/// "javascript"), so each entry carries its ecosystem vocabulary.
fn language_keywords(language: &str) -> Vec<&str> {
    match language {
        "javascript" => vec!["javascript", "js", "node", "react", "vue", "angular"],
        "typescript" => vec!["typescript", "ts", "tsx"],
        "python" => vec!["python", "py", "django", "flask", "pandas"],
        "java" => vec!["java", "spring", "maven"],
        "go" => vec!["go", "golang"],
        "rust" => vec!["rust", "rs"],
        "php" => vec!["php", "laravel", "symfony"],
        "ruby" => vec!["ruby", "rails"],
        "cpp" => vec!["c++", "cpp", "cplusplus"],
        "csharp" => vec!["c#", "csharp", ".net"],
        other => vec![other],
    }
}

/// Score one issue against a profile. Returns the rounded 0-100 score and
/// the reasons behind it.
pub fn calculate_match_score(issue: &Issue, profile: &UserProfile) -> (u8, Vec<String>) {
    calculate_match_score_at(issue, profile, Utc::now())
}

pub fn calculate_match_score_at(
    issue: &Issue,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> (u8, Vec<String>) {
    // No profile signal at all means no score to compute
    if profile.username.is_none() && profile.languages.is_empty() {
        return (0, vec![]);
    }

    let mut score = 0.0_f64;
    let mut reasons = Vec::new();

    let text = format!(
        "{} {}",
        issue.title.to_lowercase(),
        issue.body.as_deref().unwrap_or("").to_lowercase()
    );
    // Repository names carry ecosystem signal too: "django-widgets" tells
    // you more than most issue titles do
    let repo_name = issue
        .repo_name()
        .map(|r| r.to_lowercase())
        .unwrap_or_default();

    if !profile.languages.is_empty() {
        let per_language = 40.0 / profile.languages.len() as f64;
        for language in &profile.languages {
            let lang = language.to_lowercase();
            if language_keywords(&lang)
                .iter()
                .any(|kw| text.contains(kw) || repo_name.contains(kw))
            {
                score += per_language;
                reasons.push(format!("Matches your {} experience", language));
            }
        }
    }

    let repo_url = issue.repository_url.to_lowercase();
    if profile
        .repositories
        .iter()
        .any(|repo| repo_url.contains(&repo.to_lowercase()))
    {
        score += 20.0;
        reasons.push("From a repository you follow".to_string());
    }

    if !profile.preferred_topics.is_empty() {
        let per_topic = 20.0 / profile.preferred_topics.len() as f64;
        for topic in &profile.preferred_topics {
            if text.contains(&topic.to_lowercase()) {
                score += per_topic;
                reasons.push(format!("Related to {}", topic));
            }
        }
    }

    if profile.contributions < 5 && has_beginner_label(&issue.labels) {
        score += 10.0;
        reasons.push("Perfect for beginners".to_string());
    }

    if let Some(updated_at) = issue.updated_at {
        let days = (now - updated_at).num_days();
        if days < 7 {
            score += 10.0;
            reasons.push("Recently updated".to_string());
        } else if days < 30 {
            score += 5.0;
        }
    }

    ((score.round() as u64).min(100) as u8, reasons)
}

/// Score a batch of issues against a profile, drop zero-score entries,
/// and sort best-first.
pub fn match_issues(issues: Vec<Issue>, profile: &UserProfile) -> Vec<IssueMatch> {
    match_issues_at(issues, profile, Utc::now())
}

pub fn match_issues_at(
    issues: Vec<Issue>,
    profile: &UserProfile,
    now: DateTime<Utc>,
) -> Vec<IssueMatch> {
    let mut matches: Vec<IssueMatch> = issues
        .into_iter()
        .map(|issue| {
            let (match_score, reasons) = calculate_match_score_at(&issue, profile, now);
            IssueMatch {
                issue,
                match_score,
                reasons,
            }
        })
        .filter(|m| m.match_score > 0)
        .collect();

    matches.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    matches
}
