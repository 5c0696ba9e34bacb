//! Globus CLI backend
//!
//! `globus transfer` and `globus delete` only submit a task and print its id,
//! so every submission is followed by a blocking `globus task wait`. The
//! recorded speed is the one Globus reports in `globus task show`.

use super::TransferBackend;
use crate::error::Result;
use crate::executor::{CommandRunner, CommandSpec};
use crate::extract::{extract_field, extract_numeric_field, listing_contains, BYTES_PER_SECOND_FIELD, TASK_ID_FIELD};
use crate::models::{TransferJob, TrialMeasurement};
use crate::types::Tool;
use async_trait::async_trait;
use std::sync::Arc;

const COLUMNS: &[&str] = &["GlobusSpeedEstimate"];

pub struct GlobusBackend {
    runner: Arc<dyn CommandRunner>,
    /// `endpoint-id:path/` prefix of the source collection
    source: String,
    /// `endpoint-id:path/` prefix of the destination collection
    destination: String,
    verify_checksum: bool,
}

impl GlobusBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, source: String, destination: String, verify_checksum: bool) -> Self {
        Self {
            runner,
            source,
            destination,
            verify_checksum,
        }
    }

    async fn wait_for_task(&self, task_id: &str) -> Result<()> {
        self.runner
            .run(&CommandSpec::new("globus").args(["task", "wait", task_id]))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl TransferBackend for GlobusBackend {
    fn tool(&self) -> Tool {
        Tool::Globus
    }

    fn metric_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()> {
        let listing = self
            .runner
            .run(&CommandSpec::new("globus").args(["ls", self.destination.as_str()]))
            .await?;
        if !listing_contains(&listing.stdout, &job.file_name) {
            return Ok(());
        }

        let target = format!("{}{}", self.destination, job.file_name);
        let deleted = self
            .runner
            .run(&CommandSpec::new("globus").args(["delete", target.as_str()]))
            .await?;
        let task_id = extract_field(&deleted.stdout, TASK_ID_FIELD)?;
        self.wait_for_task(&task_id).await
    }

    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement> {
        let spec = CommandSpec::new("globus")
            .arg("transfer")
            .arg_if(!self.verify_checksum, "--no-verify-checksum")
            .arg(format!("{}{}", self.source, job.file_name))
            .arg(format!("{}{}", self.destination, job.file_name));
        let submitted = self.runner.run(&spec).await?;
        let task_id = extract_field(&submitted.stdout, TASK_ID_FIELD)?;

        let started = std::time::Instant::now();
        self.wait_for_task(&task_id).await?;
        let waited = started.elapsed();

        let summary = self
            .runner
            .run(&CommandSpec::new("globus").args(["task", "show", task_id.as_str()]))
            .await?;
        let bytes_per_second = extract_numeric_field(&summary.stdout, BYTES_PER_SECOND_FIELD)?;

        Ok(TrialMeasurement {
            values: vec![bytes_per_second / 1e6],
            elapsed_seconds: (submitted.elapsed + waited).as_secs_f64(),
        })
    }
}
