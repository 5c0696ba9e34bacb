//! rclone backend
//!
//! rclone will not overwrite an identical remote file, so uploads delete the
//! remote copy first and downloads delete the local one.

use super::{profiled_speed, remove_local_file, TransferBackend, PROFILED_SPEED_COLUMN};
use crate::error::Result;
use crate::executor::{CommandRunner, CommandSpec};
use crate::extract::listing_contains;
use crate::models::{TransferJob, TrialMeasurement};
use crate::types::{Direction, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const COLUMNS: &[&str] = &[PROFILED_SPEED_COLUMN];

pub struct RcloneBackend {
    runner: Arc<dyn CommandRunner>,
    direction: Direction,
    remote: String,
}

impl RcloneBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, direction: Direction, remote: String) -> Self {
        let remote = remote.trim_end_matches(':').to_string();
        Self {
            runner,
            direction,
            remote,
        }
    }

    fn remote_path(&self, file_name: &str) -> String {
        format!("{}:{}", self.remote, file_name)
    }
}

#[async_trait]
impl TransferBackend for RcloneBackend {
    fn tool(&self) -> Tool {
        Tool::Rclone
    }

    fn metric_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()> {
        if self.direction == Direction::Download {
            return remove_local_file(&job.local_path).await;
        }

        let listing = self
            .runner
            .run(&CommandSpec::new("rclone").args(["lsf".to_string(), format!("{}:", self.remote)]))
            .await?;
        if listing_contains(&listing.stdout, &job.file_name) {
            self.runner
                .run(&CommandSpec::new("rclone").args(["deletefile".to_string(), self.remote_path(&job.file_name)]))
                .await?;
        }
        Ok(())
    }

    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement> {
        let local = job.local_path.to_string_lossy().into_owned();
        let remote = self.remote_path(&job.file_name);
        let spec = match self.direction {
            Direction::Download => CommandSpec::new("rclone").args(["copyto".to_string(), remote, local]),
            _ => CommandSpec::new("rclone").args(["copyto".to_string(), local, remote]),
        };

        let output = self.runner.run(&spec).await?;
        let speed = profiled_speed(&job.local_path, output.elapsed).await?;
        Ok(TrialMeasurement {
            values: vec![speed],
            elapsed_seconds: output.elapsed.as_secs_f64(),
        })
    }
}
