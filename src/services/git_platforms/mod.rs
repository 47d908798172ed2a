pub mod github;

pub use github::GitHubClient;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Calendar;

/// Repository information from platform APIs
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub is_private: bool,
}

/// A commit as listed by the REST API, newest first
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub authored_at: DateTime<Utc>,
}

/// A public push event from the user's event feed
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub repository_name: String,
    pub created_at: DateTime<Utc>,
    pub commit_count: u32,
}

/// Configuration for a platform instance
#[derive(Clone, Debug)]
pub struct PlatformConfig {
    pub platform: String,
    pub instance_url: String,
    pub api_base_url: String,
}

impl PlatformConfig {
    /// Create a GitHub.com configuration
    pub fn github() -> Self {
        Self {
            platform: "github".to_string(),
            instance_url: "https://github.com".to_string(),
            api_base_url: "https://api.github.com".to_string(),
        }
    }

    /// Create a GitHub Enterprise (or test double) configuration from its API root
    pub fn github_custom(api_base_url: &str) -> Self {
        let api_base_url = api_base_url.trim_end_matches('/').to_string();
        let instance_url = api_base_url
            .strip_suffix("/api/v3")
            .map(str::to_string)
            .unwrap_or_else(|| api_base_url.replace("://api.", "://"));

        Self {
            platform: "github".to_string(),
            instance_url,
            api_base_url,
        }
    }

    /// Public profile page for a user on this instance
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/{}", self.instance_url, username)
    }
}

/// Data sources a git platform integration must provide
#[async_trait]
pub trait GitPlatform: Send + Sync {
    /// Fetch the contribution calendar for a window of at most one year
    async fn fetch_contribution_calendar(
        &self,
        username: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> Result<Calendar>;

    /// Fetch the user's public repositories
    async fn fetch_repositories(&self, username: &str) -> Result<Vec<Repository>>;

    /// Fetch the most recent commits of one repository, newest first
    async fn fetch_commits(&self, owner: &str, repository: &str) -> Result<Vec<Commit>>;

    /// Fetch the push events from the user's recent public activity
    async fn fetch_push_events(&self, username: &str) -> Result<Vec<PushEvent>>;
}
