use thiserror::Error;

/// All the ways things can go wrong in IssueScout
///
/// We use thiserror here because it generates the boilerplate for us.
/// Life's too short to manually implement Display and Error traits.
#[derive(Error, Debug)]
pub enum Error {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Cache operation failed: {0}")]
    CacheError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Invalid GitHub username: {0}")]
    InvalidUsername(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl Error {
    /// The scheduler applies its cooldown based on this
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited)
    }
}

impl From<issuescout_api::GitHubError> for Error {
    fn from(err: issuescout_api::GitHubError) -> Self {
        use issuescout_api::GitHubError;
        match err {
            GitHubError::RateLimited => Error::RateLimited,
            GitHubError::NotFound(what) => Error::NotFound(what),
            other => Error::ApiError(other.to_string()),
        }
    }
}

impl From<issuescout_cache::CacheError> for Error {
    fn from(err: issuescout_cache::CacheError) -> Self {
        Error::CacheError(err.to_string())
    }
}
