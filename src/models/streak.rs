use chrono::NaiveDate;
use serde::Serialize;

/// Running streak accumulator, created once per run and threaded through
/// every calendar window
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StreakResult {
    pub today_count: u32,
    pub streak_days: u32,
    pub total_commits: u64,
    /// Oldest day confirmed in the streak so far; the next consumed day must
    /// be exactly one day before it
    pub earliest_streak_date: NaiveDate,
    pub still_counting: bool,
    #[serde(skip)]
    pub(crate) today_recorded: bool,
}

impl StreakResult {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today_count: 0,
            streak_days: 0,
            total_commits: 0,
            earliest_streak_date: today,
            still_counting: true,
            today_recorded: false,
        }
    }

    /// Average commits per streak day, 0 for an empty streak
    pub fn average_commits(&self) -> f64 {
        if self.streak_days == 0 {
            0.0
        } else {
            self.total_commits as f64 / f64::from(self.streak_days)
        }
    }
}
