use crate::models::{PickStatus, Sport};
use thiserror::Error;

/// Errors raised while grading picks or talking to the collaborators
#[derive(Error, Debug)]
pub enum GradingError {
    // Grading errors
    #[error("Pick {pick_id} is already graded as {status}")]
    AlreadyGraded { pick_id: String, status: PickStatus },

    #[error("Pick {pick_id} is for game {expected}, got game {actual}")]
    GameMismatch {
        pick_id: String,
        expected: String,
        actual: String,
    },

    #[error("Pick {pick_id}: no line found in selection '{selection}'")]
    UnparseableLine { pick_id: String, selection: String },

    #[error("Pick {pick_id} is a prop bet and must be settled manually")]
    ManualResolutionRequired { pick_id: String },

    #[error("Pick {pick_id} has invalid units: {units}")]
    InvalidUnits { pick_id: String, units: f64 },

    #[error("Invalid American odds: {0}")]
    InvalidOdds(i32),

    #[error("Pick not found: {0}")]
    PickNotFound(String),

    // Collaborator errors
    #[error("Score provider failed for {sport}: {message}")]
    ScoreProvider { sport: Sport, message: String },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GradingError>;
