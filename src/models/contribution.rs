use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Commit activity for a single calendar day
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
}

impl ContributionDay {
    pub fn new(date: NaiveDate, count: u32) -> Self {
        Self { date, count }
    }
}

/// One calendar-week bucket, oldest day first (partial at the edges of a query)
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    pub days: Vec<ContributionDay>,
}

/// Contribution calendar for one queried window, weeks in chronological order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Calendar {
    pub weeks: Vec<Week>,
}

impl Calendar {
    pub fn new(weeks: Vec<Week>) -> Self {
        Self { weeks }
    }

    /// Build a calendar from days in chronological order, bucketed into
    /// Sunday-started weeks the way GitHub groups them
    #[allow(dead_code)]
    pub fn from_days(days: impl IntoIterator<Item = ContributionDay>) -> Self {
        use chrono::{Datelike, Weekday};

        let mut weeks: Vec<Week> = Vec::new();
        for day in days {
            let starts_week = day.date.weekday() == Weekday::Sun;
            match weeks.last_mut() {
                Some(week) if !starts_week => week.days.push(day),
                _ => weeks.push(Week { days: vec![day] }),
            }
        }
        Self { weeks }
    }

    /// Days newest first, flattened across weeks. Each call starts over.
    pub fn days_rev(&self) -> impl Iterator<Item = &ContributionDay> + '_ {
        self.weeks.iter().rev().flat_map(|week| week.days.iter().rev())
    }

    pub fn day_count(&self) -> usize {
        self.weeks.iter().map(|week| week.days.len()).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.day_count() == 0
    }

    pub fn total_contributions(&self) -> u64 {
        self.days_rev().map(|day| u64::from(day.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_from_days_buckets_by_sunday() {
        // 2022-12-30 is a Friday, 2023-01-01 a Sunday
        let calendar = Calendar::from_days(vec![
            ContributionDay::new(date(2022, 12, 30), 1),
            ContributionDay::new(date(2022, 12, 31), 2),
            ContributionDay::new(date(2023, 1, 1), 3),
            ContributionDay::new(date(2023, 1, 2), 4),
        ]);

        assert_eq!(calendar.weeks.len(), 2);
        assert_eq!(calendar.weeks[0].days.len(), 2);
        assert_eq!(calendar.weeks[1].days.len(), 2);
        assert_eq!(calendar.day_count(), 4);
        assert_eq!(calendar.total_contributions(), 10);
    }

    #[test]
    fn test_days_rev_is_newest_first_and_restartable() {
        let calendar = Calendar::new(vec![
            Week {
                days: vec![
                    ContributionDay::new(date(2022, 12, 31), 1),
                ],
            },
            Week {
                days: vec![
                    ContributionDay::new(date(2023, 1, 1), 2),
                    ContributionDay::new(date(2023, 1, 2), 3),
                ],
            },
        ]);

        let first: Vec<NaiveDate> = calendar.days_rev().map(|d| d.date).collect();
        assert_eq!(first, vec![date(2023, 1, 2), date(2023, 1, 1), date(2022, 12, 31)]);

        let second: Vec<NaiveDate> = calendar.days_rev().map(|d| d.date).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_calendar() {
        let calendar = Calendar::default();
        assert!(calendar.is_empty());
        assert_eq!(calendar.days_rev().count(), 0);

        let hollow = Calendar::new(vec![Week::default()]);
        assert!(hollow.is_empty());
    }
}
