pub mod commit_counter;
pub mod commit_report;
pub mod git_platforms;
pub mod message_formatter;
pub mod slack;
pub mod streak_calculator;
pub mod streak_sync;
