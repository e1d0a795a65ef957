// GitHub REST/Search API client and the plumbing around it
pub mod github;
pub mod models;
pub mod retry;
pub mod schedule;

// Re-export common types
pub use github::{GitHubClient, GitHubError};
pub use models::{
    Event, EventActor, EventPayload, EventRepo, Repo, SearchIssue, SearchIssuesResponse, User,
    WireLabel,
};
pub use retry::RetryConfig;
pub use schedule::{run_sequential, QueryOutcome, ScheduleConfig};
