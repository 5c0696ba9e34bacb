//! Transfer Benchmark
//!
//! Drives existing transfer CLIs (Globus, iRODS, rclone, gdrive, Cyberduck)
//! over a set of dummy files, records one throughput row per trial, and
//! aggregates results files into per-size mean and standard error.

pub mod app;
pub mod backends;
pub mod cli;
pub mod config;
pub mod error;
pub mod executor;
pub mod extract;
pub mod logging;
pub mod models;
pub mod output;
pub mod results;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use app::{run_aggregate, App, BenchmarkRunner};
pub use backends::{create_backend, TransferBackend};
pub use error::{AppError, Result};
pub use models::{Config, SizeLabel, TransferJob, TrialRecord};
pub use output::{ColoredFormatter, OutputFormatter, OutputFormatterFactory, PlainFormatter};
pub use stats::{AggregateRow, Aggregator, NominalSizeTable};

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
pub const BUILD_TIME: &str = env!("BUILD_TIME");
pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");

/// Default configuration values
pub mod defaults {
    pub const DEFAULT_TRIAL_COUNT: u32 = 5;
    pub const DEFAULT_VERIFY_INTEGRITY: bool = false;
    pub const DEFAULT_DUCK_REMOTE_ROOT: &str = "googledrive:My Drive";
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
