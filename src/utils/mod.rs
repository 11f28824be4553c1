pub mod data;
pub mod grader;
pub mod line_parser;
pub mod odds;
pub mod stats;

pub use grader::{grade, settle, ProfitConvention};
pub use stats::{compute_leaderboard, compute_stats, compute_stats_by_sport, sort_most_recent_first};
