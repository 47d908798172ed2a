use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Months, NaiveDate, NaiveTime};

use crate::models::StreakResult;
use crate::services::git_platforms::GitPlatform;
use crate::services::streak_calculator::{compute_streak, Continuation};

/// Inclusive date range of the calendar window ending at `end`.
///
/// GitHub rejects contribution ranges longer than a year, so a window covers
/// one calendar year minus a day: 365 or 366 days depending on leap years.
pub fn window_dates(end: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let start = end
        .checked_sub_months(Months::new(12))
        .and_then(|year_before| year_before.succ_opt())
        .ok_or_else(|| anyhow!("No contribution window fits before {}", end))?;
    Ok((start, end))
}

/// Window bounds as timestamps in the user's zone, start of the first day to
/// the last second of the final one
fn window_bounds(
    end: NaiveDate,
    offset: FixedOffset,
) -> Result<(DateTime<FixedOffset>, DateTime<FixedOffset>)> {
    let (start, end) = window_dates(end)?;
    let last_second = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| anyhow!("Invalid end-of-day time"))?;

    let from = start
        .and_time(NaiveTime::MIN)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| anyhow!("Ambiguous window start {}", start))?;
    let to = end
        .and_time(last_second)
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| anyhow!("Ambiguous window end {}", end))?;

    Ok((from, to))
}

/// Count the user's current streak, fetching one calendar window at a time
/// until the streak ends or a window adds nothing.
///
/// Any fetch failure or calendar gap aborts the count.
pub async fn count_over_period(
    platform: &dyn GitPlatform,
    username: &str,
    today: NaiveDate,
    offset: FixedOffset,
) -> Result<StreakResult> {
    let mut state = StreakResult::new(today);
    let mut window_end = today;
    let mut windows = 0u32;

    loop {
        let (from, to) = window_bounds(window_end, offset)?;
        windows += 1;

        log::info!(
            "Fetching contribution window {} for {}: {} to {}",
            windows,
            username,
            from.format("%Y-%m-%d"),
            to.format("%Y-%m-%d")
        );

        let calendar = platform
            .fetch_contribution_calendar(username, from, to)
            .await
            .with_context(|| format!("Failed to fetch contributions for {}", username))?;

        let step = compute_streak(&calendar, today, &state)?;
        state = step.state;

        match step.continuation {
            Continuation::NeedsEarlierWindow => {
                window_end = state
                    .earliest_streak_date
                    .pred_opt()
                    .ok_or_else(|| anyhow!("No date precedes {}", state.earliest_streak_date))?;
                log::debug!(
                    "Streak reaches {} after {} days, continuing",
                    state.earliest_streak_date,
                    state.streak_days
                );
            }
            Continuation::Complete => break,
            Continuation::Exhausted => {
                log::info!("Window {} added no days, stopping", windows);
                break;
            }
        }
    }

    log::info!(
        "Streak for {}: {} days, {} commits since {} ({} windows)",
        username,
        state.streak_days,
        state.total_commits,
        state.earliest_streak_date,
        windows
    );

    Ok(state)
}
