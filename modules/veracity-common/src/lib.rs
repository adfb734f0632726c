pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use config::Config;
pub use error::VeracityError;
pub use stats::{RequestStats, StatsSnapshot};
pub use types::*;
