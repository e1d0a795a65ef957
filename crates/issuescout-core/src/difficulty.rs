// Difficulty detection from issue labels
use serde::{Deserialize, Serialize};

use crate::models::Label;

/// Labels that signal an issue is friendly to first-time contributors
const BEGINNER_KEYWORDS: &[&str] = &[
    "good first issue",
    "good-first-issue",
    "first-timers-only",
    "first timers only",
    "beginner",
    "easy",
    "starter",
    "newcomer",
    "good-for-beginners",
    "good for beginners",
];

const INTERMEDIATE_KEYWORDS: &[&str] = &[
    "help wanted",
    "help-wanted",
    "medium",
    "intermediate",
    "moderate",
];

const ADVANCED_KEYWORDS: &[&str] = &[
    "expert",
    "advanced",
    "hard",
    "difficult",
    "complex",
    "challenging",
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }
}

impl std::str::FromStr for DifficultyLevel {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "beginner" => Ok(DifficultyLevel::Beginner),
            "intermediate" => Ok(DifficultyLevel::Intermediate),
            "advanced" => Ok(DifficultyLevel::Advanced),
            other => Err(crate::Error::ConfigError(format!(
                "Unknown difficulty: {}",
                other
            ))),
        }
    }
}

/// Classify an issue's difficulty from its labels.
///
/// Advanced keywords are checked first: a label like "advanced-help-wanted"
/// should count as advanced, not intermediate - ties break toward the
/// harder classification. Returns None when nothing matches.
pub fn detect_difficulty(labels: &[Label]) -> Option<DifficultyLevel> {
    if labels.is_empty() {
        return None;
    }

    let names: Vec<String> = labels.iter().map(|l| l.name.to_lowercase()).collect();

    for name in &names {
        if ADVANCED_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            return Some(DifficultyLevel::Advanced);
        }
    }

    for name in &names {
        if BEGINNER_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            return Some(DifficultyLevel::Beginner);
        }
    }

    for name in &names {
        if INTERMEDIATE_KEYWORDS.iter().any(|kw| name.contains(kw)) {
            return Some(DifficultyLevel::Intermediate);
        }
    }

    None
}

/// Beginner labels used for the new-contributor scoring bonus
pub(crate) fn has_beginner_label(labels: &[Label]) -> bool {
    const BONUS_KEYWORDS: &[&str] = &["good first issue", "beginner", "first-timers-only", "starter"];
    labels.iter().any(|l| {
        let name = l.name.to_lowercase();
        BONUS_KEYWORDS.iter().any(|kw| name.contains(kw))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<Label> {
        names.iter().map(|n| Label::new(n)).collect()
    }

    #[test]
    fn empty_labels_are_unknown() {
        assert_eq!(detect_difficulty(&[]), None);
        assert_eq!(detect_difficulty(&labels(&["bug", "docs"])), None);
    }

    #[test]
    fn detects_each_level() {
        assert_eq!(
            detect_difficulty(&labels(&["good first issue"])),
            Some(DifficultyLevel::Beginner)
        );
        assert_eq!(
            detect_difficulty(&labels(&["help wanted"])),
            Some(DifficultyLevel::Intermediate)
        );
        assert_eq!(
            detect_difficulty(&labels(&["expert"])),
            Some(DifficultyLevel::Advanced)
        );
    }

    #[test]
    fn matching_is_case_insensitive_substring() {
        assert_eq!(
            detect_difficulty(&labels(&["Good First Issue :tada:"])),
            Some(DifficultyLevel::Beginner)
        );
    }

    #[test]
    fn advanced_wins_over_cooccurring_keywords() {
        // Priority invariant: any advanced keyword dominates, regardless
        // of what else is on the issue
        assert_eq!(
            detect_difficulty(&labels(&["good first issue", "hard"])),
            Some(DifficultyLevel::Advanced)
        );
        assert_eq!(
            detect_difficulty(&labels(&["advanced-help-wanted"])),
            Some(DifficultyLevel::Advanced)
        );
        assert_eq!(
            detect_difficulty(&labels(&["help wanted", "complex", "beginner"])),
            Some(DifficultyLevel::Advanced)
        );
    }

    #[test]
    fn beginner_wins_over_intermediate() {
        assert_eq!(
            detect_difficulty(&labels(&["help wanted", "good first issue"])),
            Some(DifficultyLevel::Beginner)
        );
    }
}
