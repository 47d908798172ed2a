use std::fmt::Write as _;
use std::str::FromStr;

use crate::models::StreakResult;

/// Slack mention that notifies every member of the channel
const CHANNEL_MENTION: &str = "<!channel>";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Ja,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ja" | "ja-jp" => Ok(Self::Ja),
            "en" | "en-us" | "en-gb" => Ok(Self::En),
            other => Err(format!("Unsupported locale '{}'. Supported: ja, en", other)),
        }
    }
}

struct Labels {
    no_commits_yet: &'static str,
    today_count: &'static str,
    streak_days: &'static str,
    total_commits: &'static str,
    average: &'static str,
    since: &'static str,
}

impl Locale {
    fn labels(self) -> Labels {
        match self {
            Self::Ja => Labels {
                no_commits_yet: "今日はまだコミットしていません！",
                today_count: "今日のコミット数は",
                streak_days: "連続コミット日数は",
                total_commits: "連続期間の合計コミット数は",
                average: "1日あたりの平均コミット数は",
                since: "連続開始日は",
            },
            Self::En => Labels {
                no_commits_yet: "No commits yet today!",
                today_count: "Today's commit count is ",
                streak_days: "Current streak in days: ",
                total_commits: "Commits during the streak: ",
                average: "Average commits per day: ",
                since: "Streak started on ",
            },
        }
    }
}

fn header(today_count: u32, labels: &Labels) -> String {
    if today_count == 0 {
        format!("{} {}", CHANNEL_MENTION, labels.no_commits_yet)
    } else {
        format!("{}{}", labels.today_count, today_count)
    }
}

/// Render the streak summary posted to the channel
pub fn format_message(state: &StreakResult, profile_url: &str, locale: Locale) -> String {
    let labels = locale.labels();
    let mut message = header(state.today_count, &labels);

    // Writing into a String cannot fail
    let _ = write!(
        message,
        "\n---\n{}{}\n{}{}\n{}{:.2}\n{}{}\n---\n{}",
        labels.streak_days,
        state.streak_days,
        labels.total_commits,
        state.total_commits,
        labels.average,
        state.average_commits(),
        labels.since,
        state.earliest_streak_date.format("%Y-%m-%d"),
        profile_url,
    );

    message
}

/// Render a today-only summary for sources without streak data
pub fn format_today_message(today_count: u32, profile_url: &str, locale: Locale) -> String {
    format!("{}\n{}", header(today_count, &locale.labels()), profile_url)
}
