// GitHub Search query construction
//
// Turns a structured filter selection into a single qualifier string for
// `GET /search/issues`. Every query pins `state:open type:issue
// no:assignee` and a 30-day freshness floor so the defaults surface
// issues somebody could actually pick up today.
use chrono::{DateTime, Duration, Utc};

use crate::difficulty::DifficultyLevel;

/// How recently an issue must have been touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LastActivity {
    LastWeek,
    LastMonth,
    LastThreeMonths,
    Active,
}

impl LastActivity {
    fn days(&self) -> i64 {
        match self {
            LastActivity::LastWeek => 7,
            LastActivity::LastMonth => 30,
            LastActivity::LastThreeMonths => 90,
            // "Active" is the product's shorthand for the default window
            LastActivity::Active => 30,
        }
    }
}

impl std::str::FromStr for LastActivity {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "last-week" => Ok(LastActivity::LastWeek),
            "last-month" => Ok(LastActivity::LastMonth),
            "last-3months" => Ok(LastActivity::LastThreeMonths),
            "active" => Ok(LastActivity::Active),
            other => Err(crate::Error::ConfigError(format!(
                "Unknown activity filter: {}",
                other
            ))),
        }
    }
}

/// Everything the user can narrow a search by
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub search_term: Option<String>,
    /// Arbitrary extra labels, quoted verbatim
    pub labels: Vec<String>,
    /// Canonical category keys; "all" means no category filter
    pub categories: Vec<String>,
    /// Programming language for `language:X`
    pub language: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub issue_type: Option<String>,
    pub framework: Option<String>,
    pub last_activity: Option<LastActivity>,
}

/// Keyword each framework key expands to in the search text
fn framework_search_term(framework: &str) -> Option<&'static str> {
    match framework {
        "react" => Some("react"),
        "vue" => Some("vue"),
        "angular" => Some("angular"),
        "nextjs" => Some("next.js"),
        "nuxt" => Some("nuxt"),
        "svelte" => Some("svelte"),
        "express" => Some("express"),
        "django" => Some("django"),
        "flask" => Some("flask"),
        "rails" => Some("rails"),
        "spring" => Some("spring"),
        "laravel" => Some("laravel"),
        "fastapi" => Some("fastapi"),
        "nestjs" => Some("nestjs"),
        _ => None,
    }
}

const BEGINNER_INCLUDE: &[&str] = &["good first issue", "good-first-issue"];
const INTERMEDIATE_INCLUDE: &[&str] = &["help wanted", "help-wanted"];
const ADVANCED_INCLUDE: &[&str] = &[
    "expert",
    "advanced",
    "hard",
    "difficult",
    "complex",
    "challenging",
];
/// Advanced excludes both beginner and intermediate labels
const ADVANCED_EXCLUDE: &[&str] = &[
    "good first issue",
    "good-first-issue",
    "first-timers-only",
    "help wanted",
    "help-wanted",
];

fn label_group(labels: &[&str]) -> String {
    if labels.len() == 1 {
        format!("label:\"{}\"", labels[0])
    } else {
        let joined = labels
            .iter()
            .map(|l| format!("label:\"{}\"", l))
            .collect::<Vec<_>>()
            .join(" OR ");
        format!("({})", joined)
    }
}

impl FilterSelection {
    /// Build the query against the current wall clock
    pub fn build(&self) -> String {
        self.build_at(Utc::now())
    }

    /// Build against an explicit `now`. Freshness cutoffs are date-only,
    /// so for a fixed date the output is identical - which keeps the
    /// query usable as a cache key.
    pub fn build_at(&self, now: DateTime<Utc>) -> String {
        let mut parts = vec![
            "state:open".to_string(),
            "type:issue".to_string(),
            "no:assignee".to_string(),
        ];

        let cutoff = |days: i64| (now - Duration::days(days)).format("%Y-%m-%d").to_string();
        let base_date_filter = format!("updated:>{}", cutoff(30));

        match self.last_activity {
            Some(activity) => parts.push(format!("updated:>{}", cutoff(activity.days()))),
            None => parts.push(base_date_filter.clone()),
        }

        let advanced = self.difficulty == Some(DifficultyLevel::Advanced);

        match self.difficulty {
            Some(DifficultyLevel::Advanced) => {
                // Advanced keeps the date filter but drops category/type
                // qualifiers below: the labels already encode intent, and
                // stacking more filters tends to produce zero results
                parts.push(label_group(ADVANCED_INCLUDE));
                for label in ADVANCED_EXCLUDE {
                    parts.push(format!("-label:\"{}\"", label));
                }
            }
            Some(DifficultyLevel::Beginner) => {
                parts.push(label_group(BEGINNER_INCLUDE));
            }
            Some(DifficultyLevel::Intermediate) => {
                parts.push(label_group(INTERMEDIATE_INCLUDE));
                for label in BEGINNER_INCLUDE {
                    parts.push(format!("-label:\"{}\"", label));
                }
            }
            None => {}
        }

        if let Some(term) = self.search_term.as_deref().map(str::trim) {
            if !term.is_empty() {
                parts.push(term.to_string());
            }
        }

        if let Some(keyword) = self.framework.as_deref().and_then(framework_search_term) {
            parts.push(keyword.to_string());
        }

        if let Some(language) = &self.language {
            parts.push(format!("language:{}", language));
        }

        let categories_active =
            !self.categories.is_empty() && !self.categories.iter().any(|c| c == "all");

        if !advanced && categories_active {
            let refs: Vec<&str> = self.categories.iter().map(String::as_str).collect();
            parts.push(label_group(&refs));
        }

        if !advanced {
            if let Some(issue_type) = &self.issue_type {
                if !self.categories.contains(issue_type) {
                    parts.push(format!("label:\"{}\"", issue_type));
                }
            }
        }

        for label in &self.labels {
            parts.push(format!("label:\"{}\"", label));
        }

        let query = parts.join(" ");

        // Nothing selected at all? Serve the curated default instead of a
        // bare date filter - the product's chosen "useful empty state".
        let has_any_filter = self.difficulty.is_some()
            || self.issue_type.is_some()
            || self.framework.is_some()
            || self.language.is_some()
            || self.last_activity.is_some()
            || categories_active
            || !self.labels.is_empty()
            || self
                .search_term
                .as_deref()
                .map(|t| !t.trim().is_empty())
                .unwrap_or(false);

        let minimal = format!("state:open type:issue no:assignee {}", base_date_filter);
        if !has_any_filter && query == minimal {
            return format!(
                "{} (label:\"good first issue\" OR label:\"help wanted\")",
                minimal
            );
        }

        query
    }
}
