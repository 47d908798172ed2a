use chrono::{FixedOffset, Local, NaiveDate, Offset, Utc};
use clap::{Args, ValueEnum};
use thiserror::Error;

use crate::services::git_platforms::PlatformConfig;
use crate::services::message_formatter::Locale;
use crate::utils::validators::{validate_channel, validate_url, validate_username};

/// Where today's commit activity is read from
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CommitSource {
    /// GraphQL contribution calendar, with streak
    #[default]
    Calendar,
    /// REST commit listings of public repositories, today only
    Commits,
    /// Public push events, today only
    Events,
}

/// Command line and environment inputs, in the order the positional
/// arguments have always been given
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// GitHub login to report on
    #[arg(env = "GITHUB_USER")]
    pub user: Option<String>,

    /// Slack bot token used with chat.postMessage
    #[arg(env = "SLACK_TOKEN", hide_env_values = true)]
    pub slack_token: Option<String>,

    /// Slack channel ID or #name
    #[arg(env = "SLACK_CHANNEL")]
    pub slack_channel: Option<String>,

    /// GitHub token, required by the contribution calendar
    #[arg(env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// Slack incoming webhook, used instead of a bot token
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook_url: Option<String>,

    /// Activity source
    #[arg(long, env = "COMMIT_SOURCE", value_enum, default_value_t = CommitSource::Calendar)]
    pub source: CommitSource,

    /// Message language: ja or en
    #[arg(long, env = "MESSAGE_LOCALE", default_value = "ja")]
    pub locale: Locale,

    /// Offset of the user's day from UTC in hours; defaults to the host zone
    #[arg(long, env = "UTC_OFFSET_HOURS", allow_hyphen_values = true)]
    pub utc_offset_hours: Option<i32>,

    /// Reference date (YYYY-MM-DD) to report on instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// GitHub API root, e.g. https://github.example.com/api/v3
    #[arg(long, env = "GITHUB_API_URL")]
    pub api_base_url: Option<String>,

    /// Print the message instead of posting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing GitHub user (first argument or GITHUB_USER)")]
    MissingUser,
    #[error("the contribution calendar needs a GitHub token (fourth argument or GITHUB_TOKEN)")]
    MissingGitHubToken,
    #[error("no Slack destination: give a bot token and channel, or SLACK_WEBHOOK_URL")]
    MissingSlackDestination,
    #[error("UTC offset must be between -14 and 14 hours, got {0}")]
    InvalidUtcOffset(i32),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Where the formatted message goes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Slack { token: String, channel: String },
    Webhook { url: String },
    Stdout,
}

impl Destination {
    /// Channel label for logging; webhooks carry their own channel
    pub fn channel(&self) -> &str {
        match self {
            Self::Slack { channel, .. } => channel,
            Self::Webhook { .. } => "webhook",
            Self::Stdout => "stdout",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub username: String,
    pub github_token: Option<String>,
    pub platform: PlatformConfig,
    pub destination: Destination,
    pub source: CommitSource,
    pub locale: Locale,
    pub offset: FixedOffset,
    pub today: NaiveDate,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn invalid(field: &'static str) -> impl FnOnce(anyhow::Error) -> ConfigError {
    move |e| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    }
}

impl Config {
    pub fn from_args(args: ConfigArgs) -> Result<Self, ConfigError> {
        let username = non_empty(args.user).ok_or(ConfigError::MissingUser)?;
        validate_username(&username).map_err(invalid("GitHub user"))?;

        let github_token = non_empty(args.github_token);
        if args.source == CommitSource::Calendar && github_token.is_none() {
            return Err(ConfigError::MissingGitHubToken);
        }

        let destination = if args.dry_run {
            Destination::Stdout
        } else if let Some(url) = non_empty(args.slack_webhook_url) {
            validate_url(&url).map_err(invalid("Slack webhook URL"))?;
            Destination::Webhook { url }
        } else {
            match (non_empty(args.slack_token), non_empty(args.slack_channel)) {
                (Some(token), Some(channel)) => {
                    validate_channel(&channel).map_err(invalid("Slack channel"))?;
                    Destination::Slack { token, channel }
                }
                _ => return Err(ConfigError::MissingSlackDestination),
            }
        };

        let offset = match args.utc_offset_hours {
            Some(hours) => (-14..=14)
                .contains(&hours)
                .then(|| FixedOffset::east_opt(hours * 3600))
                .flatten()
                .ok_or(ConfigError::InvalidUtcOffset(hours))?,
            None => Local::now().offset().fix(),
        };

        let platform = match non_empty(args.api_base_url) {
            Some(url) => {
                validate_url(&url).map_err(invalid("GitHub API URL"))?;
                PlatformConfig::github_custom(&url)
            }
            None => PlatformConfig::github(),
        };

        let today = args
            .today
            .unwrap_or_else(|| Utc::now().with_timezone(&offset).date_naive());

        Ok(Config {
            username,
            github_token,
            platform,
            destination,
            source: args.source,
            locale: args.locale,
            offset,
            today,
        })
    }
}
