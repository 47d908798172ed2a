use anyhow::{Context, Result};
use chrono::{FixedOffset, NaiveDate};

use crate::services::git_platforms::{Commit, GitPlatform, PushEvent};

/// Number of leading commits authored on `day`. Listings are newest first, so
/// counting stops at the first older commit.
fn commits_on(commits: &[Commit], day: NaiveDate, offset: FixedOffset) -> u32 {
    commits
        .iter()
        .take_while(|commit| commit.authored_at.with_timezone(&offset).date_naive() == day)
        .count() as u32
}

/// Commits carried by push events created on `day`
fn pushed_on(events: &[PushEvent], day: NaiveDate, offset: FixedOffset) -> u32 {
    events
        .iter()
        .filter(|event| event.created_at.with_timezone(&offset).date_naive() == day)
        .inspect(|event| {
            log::debug!("{} commits pushed to {}", event.commit_count, event.repository_name)
        })
        .map(|event| event.commit_count)
        .sum()
}

/// Count today's commits across the user's public repositories via the REST
/// commit listings
pub async fn count_commits_today(
    platform: &dyn GitPlatform,
    username: &str,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<u32> {
    let repositories = platform
        .fetch_repositories(username)
        .await
        .with_context(|| format!("Failed to list repositories for {}", username))?;

    let mut total = 0;
    for repository in &repositories {
        if repository.is_private {
            continue;
        }

        let commits = platform
            .fetch_commits(username, &repository.name)
            .await
            .with_context(|| format!("Failed to list commits for {}", repository.full_name))?;

        let count = commits_on(&commits, today, offset);
        if count > 0 {
            log::info!(
                "{} commits today in {} (latest {})",
                count,
                repository.full_name,
                commits[0].sha
            );
        }
        total += count;
    }

    log::info!(
        "Counted {} commits today across {} repositories",
        total,
        repositories.len()
    );

    Ok(total)
}

/// Count today's commits from the user's public push events
pub async fn count_pushed_commits_today(
    platform: &dyn GitPlatform,
    username: &str,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<u32> {
    let events = platform
        .fetch_push_events(username)
        .await
        .with_context(|| format!("Failed to fetch events for {}", username))?;

    let total = pushed_on(&events, today, offset);
    log::info!("Counted {} pushed commits today from {} push events", total, events.len());

    Ok(total)
}
