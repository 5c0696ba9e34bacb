//! Transfer tool backends
//!
//! Each backend knows how to clear a previous copy of a dummy file from the
//! destination and how to run one timed transfer with its tool. Cleanup always
//! completes (including any asynchronous task it starts) before the transfer
//! command is issued, and only the transfer command itself is timed.

pub mod cyberduck;
pub mod gdrive;
pub mod globus;
pub mod irods;
pub mod rclone;

pub use cyberduck::CyberduckBackend;
pub use gdrive::GdriveBackend;
pub use globus::GlobusBackend;
pub use irods::IrodsBackend;
pub use rclone::RcloneBackend;

use crate::error::{AppError, ErrorContext, Result};
use crate::executor::CommandRunner;
use crate::models::{Config, TransferJob, TrialMeasurement};
use crate::types::{Direction, Tool};
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Speed computed from the local file size and the timed transfer
pub const PROFILED_SPEED_COLUMN: &str = "ProfiledSpeed";

/// One transfer tool
#[async_trait]
pub trait TransferBackend: Send + Sync {
    fn tool(&self) -> Tool;

    /// Result columns after `FileSize`, in the order of
    /// [`TrialMeasurement::values`]
    fn metric_columns(&self) -> &'static [&'static str];

    /// Remove any previous copy of the job's file from the destination
    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()>;

    /// Run one timed transfer of the job's file
    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement>;
}

/// Build the backend for the configured tool
pub fn create_backend(config: &Config, runner: Arc<dyn CommandRunner>) -> Result<Box<dyn TransferBackend>> {
    let direction = config.direction();
    let verify = config.verify_integrity;

    let backend: Box<dyn TransferBackend> = match config.tool {
        Tool::Globus => {
            let source = required(config.source_endpoint.as_deref(), "SOURCE_ENDPOINT")?;
            let destination = required(config.destination_endpoint.as_deref(), "DESTINATION_ENDPOINT")?;
            Box::new(GlobusBackend::new(runner, source, destination, verify))
        }
        Tool::Irods => Box::new(IrodsBackend::new(runner, local_direction(direction)?, verify)),
        Tool::Rclone => {
            let remote = required(config.rclone_remote.as_deref(), "RCLONE_REMOTE")?;
            Box::new(RcloneBackend::new(runner, local_direction(direction)?, remote))
        }
        Tool::Gdrive => Box::new(GdriveBackend::new(runner, local_direction(direction)?)),
        Tool::Cyberduck => {
            let username = required(config.duck_username.as_deref(), "DUCK_USERNAME")?;
            Box::new(CyberduckBackend::new(
                runner,
                local_direction(direction)?,
                username,
                &config.duck_remote_root,
            ))
        }
    };

    Ok(backend)
}

fn required(value: Option<&str>, name: &str) -> Result<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AppError::config(format!("{} is required for this transfer tool", name)))
}

/// Only Globus can move data between two remote sites
fn local_direction(direction: Direction) -> Result<Direction> {
    match direction {
        Direction::ThirdParty => Err(AppError::config(
            "This tool needs the benchmarking machine on one side of the transfer",
        )),
        other => Ok(other),
    }
}

/// MB/s from the size of the local copy after the transfer
pub(crate) async fn profiled_speed(local_path: &Path, elapsed: Duration) -> Result<f64> {
    let metadata = tokio::fs::metadata(local_path)
        .await
        .with_context(|| format!("Reading size of {}", local_path.display()))?;
    let seconds = elapsed.as_secs_f64();
    if seconds <= 0.0 {
        return Err(AppError::internal("Transfer finished in zero time"));
    }
    Ok(metadata.len() as f64 / 1e6 / seconds)
}

/// Delete a local file if present
pub(crate) async fn remove_local_file(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(AppError::io(format!("Removing {}: {}", path.display(), e))),
    }
}
