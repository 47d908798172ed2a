use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{Calendar, StreakResult};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StreakError {
    /// A day did not immediately precede the current streak boundary
    #[error("calendar gap: expected {expected}, found {actual}")]
    ContiguityFault {
        expected: NaiveDate,
        actual: NaiveDate,
    },
    #[error("no date precedes {0}")]
    DateOutOfRange(NaiveDate),
}

/// What the caller should do after a window has been consumed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Continuation {
    /// A zero day ended the streak
    Complete,
    /// The window ran out before the streak did; fetch the one before it
    NeedsEarlierWindow,
    /// The window contributed nothing, so an earlier one would not either
    Exhausted,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreakStep {
    pub state: StreakResult,
    pub continuation: Continuation,
}

/// Consume one calendar window newest day first, extending `state`.
///
/// `today` is the caller's reference date. Today's count is recorded on its
/// first encounter only, and a zero today never ends the streak since the day
/// is still in progress. Every other day must be exactly one day older than
/// the boundary in `state.earliest_streak_date`; anything else is a
/// [`StreakError::ContiguityFault`] and `state` is left as it was.
pub fn compute_streak(
    window: &Calendar,
    today: NaiveDate,
    state: &StreakResult,
) -> Result<StreakStep, StreakError> {
    let mut next = state.clone();
    let mut progressed = false;

    if !next.still_counting {
        return Ok(StreakStep {
            state: next,
            continuation: Continuation::Complete,
        });
    }

    for day in window.days_rev() {
        if day.date > today {
            log::debug!("Skipping future day {}", day.date);
            continue;
        }

        if day.date == today {
            if !next.today_recorded {
                next.today_recorded = true;
                next.today_count = day.count;
                if day.count > 0 {
                    next.streak_days += 1;
                    next.total_commits += u64::from(day.count);
                }
                progressed = true;
            }
            continue;
        }

        if day.date >= next.earliest_streak_date {
            log::debug!("Skipping already consumed day {}", day.date);
            continue;
        }

        let expected = next
            .earliest_streak_date
            .pred_opt()
            .ok_or(StreakError::DateOutOfRange(next.earliest_streak_date))?;
        if day.date != expected {
            return Err(StreakError::ContiguityFault {
                expected,
                actual: day.date,
            });
        }

        progressed = true;

        if day.count == 0 {
            next.still_counting = false;
            return Ok(StreakStep {
                state: next,
                continuation: Continuation::Complete,
            });
        }

        next.streak_days += 1;
        next.total_commits += u64::from(day.count);
        next.earliest_streak_date = day.date;
    }

    let continuation = if progressed {
        Continuation::NeedsEarlierWindow
    } else {
        Continuation::Exhausted
    };

    Ok(StreakStep {
        state: next,
        continuation,
    })
}
