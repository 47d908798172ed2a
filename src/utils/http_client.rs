use anyhow::{Context, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Create a configured HTTP client for the GitHub and Slack APIs
pub fn create_http_client() -> Result<Client> {
    ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .context("Failed to create HTTP client")
}
