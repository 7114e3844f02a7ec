pub mod book;
pub mod goal;
pub mod stats;

pub use book::BookRef;
pub use goal::{format_duration, parse_goal, percent_complete, DEFAULT_GOAL_MINUTES, MAX_GOAL_MINUTES};
pub use stats::{ReadingDay, ReadingStats, StatsSnapshot, UserId};
