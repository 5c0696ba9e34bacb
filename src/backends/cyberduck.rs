//! Cyberduck CLI (`duck`) backend

use super::{profiled_speed, remove_local_file, TransferBackend, PROFILED_SPEED_COLUMN};
use crate::error::Result;
use crate::executor::{CommandRunner, CommandSpec};
use crate::extract::{mean_speed_reading, DUCK_SPEED_SUFFIX};
use crate::models::{TransferJob, TrialMeasurement};
use crate::types::{Direction, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const COLUMNS: &[&str] = &[PROFILED_SPEED_COLUMN, "CyberduckEstimate"];

pub struct CyberduckBackend {
    runner: Arc<dyn CommandRunner>,
    direction: Direction,
    username: String,
    /// Remote folder, e.g. `googledrive:My Drive`
    remote_root: String,
}

impl CyberduckBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, direction: Direction, username: String, remote_root: &str) -> Self {
        Self {
            runner,
            direction,
            username,
            remote_root: remote_root.trim_end_matches('/').to_string(),
        }
    }

    fn transfer_command(&self, job: &TransferJob) -> CommandSpec {
        let mode = match self.direction {
            Direction::Download => "--download",
            _ => "--upload",
        };
        CommandSpec::new("duck").args([
            "--username".to_string(),
            self.username.clone(),
            mode.to_string(),
            format!("{}/{}", self.remote_root, job.file_name),
            job.local_path.to_string_lossy().into_owned(),
            "--existing".to_string(),
            "overwrite".to_string(),
        ])
    }
}

#[async_trait]
impl TransferBackend for CyberduckBackend {
    fn tool(&self) -> Tool {
        Tool::Cyberduck
    }

    fn metric_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()> {
        // Uploads rely on `--existing overwrite`
        if self.direction == Direction::Download {
            remove_local_file(&job.local_path).await?;
        }
        Ok(())
    }

    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement> {
        let output = self.runner.run(&self.transfer_command(job)).await?;
        let speed = profiled_speed(&job.local_path, output.elapsed).await?;
        let estimate = mean_speed_reading(&output.combined(), DUCK_SPEED_SUFFIX)?;

        Ok(TrialMeasurement {
            values: vec![speed, estimate],
            elapsed_seconds: output.elapsed.as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::testing::ScriptedRunner;
    use std::time::Duration;
    use tempfile::TempDir;

    const DUCK_OUTPUT: &str = "\
Upload Temp_1M.txt (1.0 MB) 200.0 KB/sec
Upload Temp_1M.txt (1.0 MB) 600.0 KB/sec
Upload Temp_1M.txt (1.0 MB) 1.0 MB/sec
";

    fn backend(runner: Arc<ScriptedRunner>, direction: Direction) -> CyberduckBackend {
        CyberduckBackend::new(runner, direction, "user@example.edu".to_string(), "googledrive:My Drive/")
    }

    #[tokio::test]
    async fn test_upload_command_and_estimate() {
        let dir = TempDir::new().unwrap();
        let job = TransferJob::from_entry("Temp_1M.txt", Some(dir.path())).unwrap();
        std::fs::write(&job.local_path, vec![0u8; 1_000_000]).unwrap();

        let runner = Arc::new(ScriptedRunner::new().respond_after("duck", DUCK_OUTPUT, Duration::from_secs(2)));
        let backend = backend(runner.clone(), Direction::Upload);

        backend.cleanup_destination(&job).await.unwrap();
        assert!(job.local_path.exists());
        let measurement = backend.transfer(&job).await.unwrap();

        let spec = backend.transfer_command(&job);
        assert_eq!(spec.args[..4], ["--username", "user@example.edu", "--upload", "googledrive:My Drive/Temp_1M.txt"]);
        assert_eq!(spec.args[5..], ["--existing", "overwrite"]);
        assert_eq!(runner.calls().len(), 1);
        assert!((measurement.values[0] - 0.5).abs() < 1e-9);
        assert!((measurement.values[1] - 0.6).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_download_clears_local_copy() {
        let dir = TempDir::new().unwrap();
        let job = TransferJob::from_entry("Temp_1M.txt", Some(dir.path())).unwrap();
        std::fs::write(&job.local_path, b"old").unwrap();

        let runner = Arc::new(ScriptedRunner::new());
        let backend = backend(runner, Direction::Download);
        backend.cleanup_destination(&job).await.unwrap();
        assert!(!job.local_path.exists());
        assert_eq!(backend.transfer_command(&job).args[2], "--download");
    }

    #[tokio::test]
    async fn test_output_without_readings_fails() {
        let dir = TempDir::new().unwrap();
        let job = TransferJob::from_entry("Temp_1M.txt", Some(dir.path())).unwrap();
        std::fs::write(&job.local_path, b"x").unwrap();

        let runner = Arc::new(ScriptedRunner::new().respond("duck", "Login failed\n"));
        let err = backend(runner, Direction::Upload).transfer(&job).await.unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
    }
}
