//! iRODS icommands backend (CyVerse data store)

use super::{profiled_speed, remove_local_file, TransferBackend, PROFILED_SPEED_COLUMN};
use crate::error::Result;
use crate::executor::{CommandRunner, CommandSpec};
use crate::extract::listing_contains;
use crate::models::{TransferJob, TrialMeasurement};
use crate::types::{Direction, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const COLUMNS: &[&str] = &[PROFILED_SPEED_COLUMN];

pub struct IrodsBackend {
    runner: Arc<dyn CommandRunner>,
    direction: Direction,
    /// Pass `-K` so iRODS verifies checksums
    verify_checksum: bool,
}

impl IrodsBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, direction: Direction, verify_checksum: bool) -> Self {
        Self {
            runner,
            direction,
            verify_checksum,
        }
    }

    fn transfer_command(&self, job: &TransferJob) -> CommandSpec {
        let local = job.local_path.to_string_lossy().into_owned();
        match self.direction {
            Direction::Download => CommandSpec::new("iget")
                .arg_if(self.verify_checksum, "-K")
                .args([job.file_name.clone(), local]),
            _ => CommandSpec::new("iput").arg_if(self.verify_checksum, "-K").arg(local),
        }
    }
}

#[async_trait]
impl TransferBackend for IrodsBackend {
    fn tool(&self) -> Tool {
        Tool::Irods
    }

    fn metric_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()> {
        if self.direction == Direction::Download {
            return remove_local_file(&job.local_path).await;
        }

        let listing = self.runner.run(&CommandSpec::new("ils")).await?;
        if listing_contains(&listing.stdout, &job.file_name) {
            self.runner
                .run(&CommandSpec::new("irm").arg(job.file_name.as_str()))
                .await?;
        }
        Ok(())
    }

    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement> {
        let output = self.runner.run(&self.transfer_command(job)).await?;
        let speed = profiled_speed(&job.local_path, output.elapsed).await?;
        Ok(TrialMeasurement {
            values: vec![speed],
            elapsed_seconds: output.elapsed.as_secs_f64(),
        })
    }
}
