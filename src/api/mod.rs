pub mod scores_api;

pub use scores_api::{CachedScores, GameScoreProvider, ScoresApiClient};
