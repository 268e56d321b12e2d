//! Turns per-player box scores into leakage-safe train/validation/test
//! feature partitions for next-game stat prediction.

pub mod aggregate;
pub mod box_score;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod features;
pub mod leakage;
pub mod materialize;
pub mod pipeline;
pub mod split;
pub mod table;

pub use config::PipelineConfig;
pub use error::{PrepError, Result};
