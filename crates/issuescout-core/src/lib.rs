// Core business logic lives here - the brain of the operation
pub mod bounty;
pub mod bounty_feed;
pub mod config;
pub mod contributions;
pub mod contributor_feed;
pub mod difficulty;
pub mod error;
pub mod freshness;
pub mod issue_search;
pub mod language;
pub mod live_feed;
pub mod matcher;
pub mod models;
pub mod personalized;
pub mod query;
pub mod repo_languages;
pub mod source;
pub mod validate;

pub use bounty_feed::{BountyFeed, BountyFeedConfig, RefreshOutcome};
pub use config::Config;
pub use difficulty::DifficultyLevel;
pub use error::Error;
pub use freshness::{Freshness, FreshnessStatus};
pub use issue_search::{IssueSearch, SearchOutcome};
pub use language::NaturalLanguage;
pub use matcher::{IssueMatch, UserProfile};
pub use models::{Issue, IssueState, Label};
pub use query::{FilterSelection, LastActivity};
pub use source::{GitHubIssueSource, IssueSource, SearchPage};

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
