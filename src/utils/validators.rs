use anyhow::{anyhow, Result};
use url::Url;

/// Validate that a string is a valid URL with http or https scheme
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str)
        .map_err(|e| anyhow!("Invalid URL format: {}", e))?;

    // Only allow http and https schemes
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(anyhow!(
            "URL must use http or https scheme, got: {}",
            url.scheme()
        ));
    }

    // Must have a host
    if url.host_str().is_none() {
        return Err(anyhow!("URL must have a host"));
    }

    Ok(url)
}

/// Validate a GitHub login: 1-39 alphanumerics or single inner hyphens
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() || username.len() > 39 {
        return Err(anyhow!(
            "Username must be between 1 and 39 characters"
        ));
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(anyhow!(
            "Username can only contain alphanumeric characters and hyphens"
        ));
    }

    if username.starts_with('-') || username.ends_with('-') || username.contains("--") {
        return Err(anyhow!(
            "Username cannot start or end with a hyphen or contain consecutive hyphens"
        ));
    }

    Ok(())
}

/// Validate a Slack channel reference: an ID like `C0123ABC` or `#name`
pub fn validate_channel(channel: &str) -> Result<()> {
    let name = channel.strip_prefix('#').unwrap_or(channel);

    if name.is_empty() || name.len() > 80 {
        return Err(anyhow!("Channel must be between 1 and 80 characters"));
    }

    if name.chars().any(char::is_whitespace) {
        return Err(anyhow!("Channel cannot contain whitespace"));
    }

    // Names are lowercase, IDs uppercase
    if channel.starts_with('#') && name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(anyhow!("Channel names cannot contain uppercase letters"));
    }

    Ok(())
}
