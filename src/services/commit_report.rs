use anyhow::Result;

use crate::services::commit_counter::{count_commits_today, count_pushed_commits_today};
use crate::services::git_platforms::GitPlatform;
use crate::services::message_formatter::{format_message, format_today_message};
use crate::services::slack::Notifier;
use crate::services::streak_sync::count_over_period;
use crate::utils::config::{CommitSource, Config};

/// How a run ended, mapped onto the process exit code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Delivered,
    /// Nothing was posted because the activity could not be computed
    ComputationFailed,
    /// The message was computed but Slack did not take it
    DeliveryFailed,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Delivered => 0,
            Self::ComputationFailed => 1,
            Self::DeliveryFailed => 2,
        }
    }
}

/// Fetch the user's activity from the configured source and render it
pub async fn build_report(platform: &dyn GitPlatform, config: &Config) -> Result<String> {
    let profile_url = config.platform.profile_url(&config.username);

    let message = match config.source {
        CommitSource::Calendar => {
            let state =
                count_over_period(platform, &config.username, config.today, config.offset).await?;
            format_message(&state, &profile_url, config.locale)
        }
        CommitSource::Commits => {
            let count =
                count_commits_today(platform, &config.username, config.today, config.offset)
                    .await?;
            format_today_message(count, &profile_url, config.locale)
        }
        CommitSource::Events => {
            let count = count_pushed_commits_today(
                platform,
                &config.username,
                config.today,
                config.offset,
            )
            .await?;
            format_today_message(count, &profile_url, config.locale)
        }
    };

    Ok(message)
}

/// Compute the report and hand it to the notifier. Nothing is posted when the
/// computation fails.
pub async fn run(platform: &dyn GitPlatform, notifier: &dyn Notifier, config: &Config) -> RunStatus {
    let message = match build_report(platform, config).await {
        Ok(message) => message,
        Err(e) => {
            log::error!("Failed to compute commit report for {}: {:#}", config.username, e);
            return RunStatus::ComputationFailed;
        }
    };

    match notifier
        .post_message(config.destination.channel(), &message)
        .await
    {
        Ok(()) => RunStatus::Delivered,
        Err(e) => {
            log::error!("Failed to post message: {}", e);
            RunStatus::DeliveryFailed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::message_formatter::Locale;
    use crate::services::slack::NotifyError;
    use crate::services::streak_sync::tests::HistoryPlatform;
    use crate::utils::config::Destination;
    use crate::services::git_platforms::PlatformConfig;
    use async_trait::async_trait;
    use chrono::{FixedOffset, NaiveDate};
    use std::sync::Mutex;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 3).unwrap()
    }

    fn config(source: CommitSource) -> Config {
        Config {
            username: "octocat".to_string(),
            github_token: Some("ghp_test".to_string()),
            platform: PlatformConfig::github(),
            destination: Destination::Slack {
                token: "xoxb-test".to_string(),
                channel: "C0123ABCD".to_string(),
            },
            source,
            locale: Locale::En,
            offset: FixedOffset::east_opt(9 * 3600).unwrap(),
            today: today(),
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<(String, String)>>,
        reject: bool,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn post_message(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
            if self.reject {
                return Err(NotifyError::Api("channel_not_found".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((channel.to_string(), text.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_no_commits_scenario_posts_notice() {
        let platform = HistoryPlatform::ending(today(), &[0, 0]);
        let notifier = RecordingNotifier::default();

        let status = run(&platform, &notifier, &config(CommitSource::Calendar)).await;

        assert_eq!(status, RunStatus::Delivered);
        let sent = notifier.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "C0123ABCD");
        assert!(sent[0].1.starts_with("<!channel> No commits yet today!"));
        assert!(sent[0].1.contains("Current streak in days: 0"));
        assert!(sent[0].1.ends_with("https://github.com/octocat"));
    }

    #[tokio::test]
    async fn test_streak_report() {
        let platform = HistoryPlatform::ending(today(), &[0, 1, 3, 2]);

        let message = build_report(&platform, &config(CommitSource::Calendar))
            .await
            .unwrap();

        assert!(message.starts_with("Today's commit count is 2\n"));
        assert!(message.contains("Current streak in days: 3\n"));
        assert!(message.contains("Commits during the streak: 6\n"));
        assert!(message.contains("Average commits per day: 2.00\n"));
        assert!(message.contains("Streak started on 2023-01-01\n"));
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_notification() {
        let mut platform = HistoryPlatform::ending(today(), &[1]);
        platform.fail = true;
        let notifier = RecordingNotifier::default();

        let status = run(&platform, &notifier, &config(CommitSource::Calendar)).await;

        assert_eq!(status, RunStatus::ComputationFailed);
        assert_eq!(status.exit_code(), 1);
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported() {
        let platform = HistoryPlatform::ending(today(), &[1]);
        let notifier = RecordingNotifier {
            reject: true,
            ..RecordingNotifier::default()
        };

        let status = run(&platform, &notifier, &config(CommitSource::Calendar)).await;

        assert_eq!(status, RunStatus::DeliveryFailed);
        assert_eq!(status.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_rest_sources_report_today_only() {
        let platform = HistoryPlatform::ending(today(), &[1]);

        for source in [CommitSource::Commits, CommitSource::Events] {
            let message = build_report(&platform, &config(source)).await.unwrap();
            assert_eq!(
                message,
                "<!channel> No commits yet today!\nhttps://github.com/octocat"
            );
        }
    }
}
