pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod store;
pub mod utils;

pub use api::*;
pub use config::Config;
pub use error::{GradingError, Result};
pub use models::*;
pub use scheduler::{GradingScheduler, PassReport};
pub use store::{JsonPickStore, PickStore};
pub use utils::*;
