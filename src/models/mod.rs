pub mod contribution;
pub mod streak;

pub use contribution::{Calendar, ContributionDay, Week};
pub use streak::StreakResult;
