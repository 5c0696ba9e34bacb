//! Data models and structures for the transfer benchmark

pub mod config;
pub mod trial;

// Re-export main model types
pub use config::Config;
pub use trial::{SizeLabel, TransferJob, TrialMeasurement, TrialRecord, FILE_SIZE_COLUMN};
