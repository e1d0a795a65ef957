// Issue freshness classification from update timestamps
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FreshnessStatus {
    /// Updated within the last 7 days
    Active,
    /// 7 to 29 days since the last update
    Stale,
    /// 30 days or more - probably nobody's looking
    Inactive,
}

impl FreshnessStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FreshnessStatus::Active => "Active",
            FreshnessStatus::Stale => "Stale",
            FreshnessStatus::Inactive => "Inactive",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Freshness {
    pub status: FreshnessStatus,
    pub days_since_update: i64,
    pub label: &'static str,
    /// Humanized relative time ("Updated 3 weeks ago")
    pub description: String,
}

impl Freshness {
    /// Classify using the current wall clock
    pub fn calculate(updated_at: Option<DateTime<Utc>>, created_at: DateTime<Utc>) -> Self {
        Self::calculate_at(updated_at, created_at, Utc::now())
    }

    /// Classify relative to an explicit `now`, so tests don't race the clock
    pub fn calculate_at(
        updated_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        let reference = updated_at.unwrap_or(created_at);
        let days = (now - reference).num_days().max(0);

        let (status, description) = if days < 7 {
            let description = match days {
                0 => "Updated today".to_string(),
                1 => "Updated yesterday".to_string(),
                n => format!("Updated {} days ago", n),
            };
            (FreshnessStatus::Active, description)
        } else if days < 30 {
            let weeks = days / 7;
            let description = if weeks == 1 {
                "Updated 1 week ago".to_string()
            } else {
                format!("Updated {} weeks ago", weeks)
            };
            (FreshnessStatus::Stale, description)
        } else {
            let months = days / 30;
            let description = if months == 1 {
                "Updated 1 month ago".to_string()
            } else {
                format!("Updated {} months ago", months)
            };
            (FreshnessStatus::Inactive, description)
        };

        Self {
            status,
            days_since_update: days,
            label: status.label(),
            description,
        }
    }
}
