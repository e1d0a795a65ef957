use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
///
/// Loaded from the config file with env vars layered on top by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub feeds: FeedConfig,
}

impl Config {
    /// Load config from the default location, falling back to defaults
    /// when no file exists yet
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&contents)
                .map_err(|e| crate::Error::ConfigError(format!("Failed to parse config: {}", e)))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to disk
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::ConfigError(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// XDG config dir on Unix-like systems, AppData on Windows
    fn config_path() -> crate::Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find config directory".into()))?
            .join("issuescout");

        Ok(config_dir.join("config.toml"))
    }

    /// Where the language cache database lives
    pub fn language_db_path() -> crate::Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| crate::Error::ConfigError("Could not find data directory".into()))?
            .join("issuescout");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir.join("languages.db"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// GitHub personal access token
    /// Get one at https://github.com/settings/tokens
    pub token: Option<String>,

    /// API URL (for GitHub Enterprise)
    #[serde(default = "default_github_url")]
    pub api_url: String,
}

fn default_github_url() -> String {
    "https://api.github.com".to_string()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_url: default_github_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL for in-memory search response caching
    #[serde(default = "default_request_ttl")]
    pub request_ttl_minutes: u64,

    /// TTL for the on-disk repository language cache
    #[serde(default = "default_language_ttl")]
    pub language_ttl_hours: u64,
}

fn default_request_ttl() -> u64 {
    5
}

fn default_language_ttl() -> u64 {
    24
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            request_ttl_minutes: default_request_ttl(),
            language_ttl_hours: default_language_ttl(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Max items kept in the bounty feed
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Page size for search requests
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Seconds between bounty feed refreshes in watch mode
    #[serde(default = "default_bounty_poll")]
    pub bounty_poll_secs: u64,

    /// Seconds between live feed refreshes in watch mode
    #[serde(default = "default_live_poll")]
    pub live_poll_secs: u64,

    /// Pause between the sequential bounty queries
    #[serde(default = "default_inter_query_delay")]
    pub inter_query_delay_ms: u64,

    /// Extra pause after hitting a rate limit
    #[serde(default = "default_rate_limit_cooldown")]
    pub rate_limit_cooldown_ms: u64,

    /// How many recommendations the personalized feed returns
    #[serde(default = "default_personalized_limit")]
    pub personalized_limit: usize,
}

fn default_capacity() -> usize {
    30
}

fn default_per_page() -> u32 {
    30
}

fn default_bounty_poll() -> u64 {
    120
}

fn default_live_poll() -> u64 {
    30
}

fn default_inter_query_delay() -> u64 {
    800
}

fn default_rate_limit_cooldown() -> u64 {
    2000
}

fn default_personalized_limit() -> usize {
    10
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            per_page: default_per_page(),
            bounty_poll_secs: default_bounty_poll(),
            live_poll_secs: default_live_poll(),
            inter_query_delay_ms: default_inter_query_delay(),
            rate_limit_cooldown_ms: default_rate_limit_cooldown(),
            personalized_limit: default_personalized_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert!(config.github.token.is_none());
        assert_eq!(config.cache.request_ttl_minutes, 5);
        assert_eq!(config.feeds.capacity, 30);
        assert_eq!(config.feeds.inter_query_delay_ms, 800);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            [github]
            token = "ghp_test"

            [feeds]
            capacity = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.github.token.as_deref(), Some("ghp_test"));
        assert_eq!(config.github.api_url, "https://api.github.com");
        assert_eq!(config.feeds.capacity, 50);
        assert_eq!(config.feeds.per_page, 30);
    }

    #[test]
    fn round_trips_through_toml() {
        let config = Config::default();
        let serialized = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.feeds.bounty_poll_secs, config.feeds.bounty_poll_secs);
    }
}
