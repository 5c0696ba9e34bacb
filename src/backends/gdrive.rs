//! gdrive backend
//!
//! Google Drive addresses files by id, not name, and happily stores several
//! files with the same name. Names are mapped to ids through `gdrive list`.

use super::{profiled_speed, remove_local_file, TransferBackend, PROFILED_SPEED_COLUMN};
use crate::error::{AppError, Result};
use crate::executor::{CommandRunner, CommandSpec};
use crate::extract::{first_speed_reading, gdrive_file_ids, GDRIVE_SPEED_SUFFIX};
use crate::models::{TransferJob, TrialMeasurement};
use crate::types::{Direction, Tool};
use async_trait::async_trait;
use std::sync::Arc;

const COLUMNS: &[&str] = &[PROFILED_SPEED_COLUMN, "GdriveEstimate"];

pub struct GdriveBackend {
    runner: Arc<dyn CommandRunner>,
    direction: Direction,
}

impl GdriveBackend {
    pub fn new(runner: Arc<dyn CommandRunner>, direction: Direction) -> Self {
        Self { runner, direction }
    }

    /// Ids of every remote file named exactly `file_name`
    async fn find_file_ids(&self, file_name: &str) -> Result<Vec<String>> {
        let listing = self.runner.run(&CommandSpec::new("gdrive").arg("list")).await?;
        Ok(gdrive_file_ids(&listing.stdout, file_name))
    }
}

#[async_trait]
impl TransferBackend for GdriveBackend {
    fn tool(&self) -> Tool {
        Tool::Gdrive
    }

    fn metric_columns(&self) -> &'static [&'static str] {
        COLUMNS
    }

    async fn cleanup_destination(&self, job: &TransferJob) -> Result<()> {
        if self.direction == Direction::Download {
            return remove_local_file(&job.local_path).await;
        }

        // Duplicates are allowed, so every same-named copy goes
        for id in self.find_file_ids(&job.file_name).await? {
            self.runner
                .run(&CommandSpec::new("gdrive").args(["delete", id.as_str()]))
                .await?;
        }
        Ok(())
    }

    async fn transfer(&self, job: &TransferJob) -> Result<TrialMeasurement> {
        let local = job.local_path.to_string_lossy().into_owned();
        let spec = match self.direction {
            Direction::Download => {
                let id = self
                    .find_file_ids(&job.file_name)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        AppError::extraction(format!("No Google Drive file named '{}' in 'gdrive list'", job.file_name))
                    })?;
                let dir = job.local_directory().to_string_lossy().into_owned();
                CommandSpec::new("gdrive").args(["download".to_string(), "--force".to_string(), "--path".to_string(), dir, id])
            }
            _ => CommandSpec::new("gdrive").args(["upload".to_string(), local]),
        };

        let output = self.runner.run(&spec).await?;
        let speed = profiled_speed(&job.local_path, output.elapsed).await?;
        let estimate = first_speed_reading(&output.combined(), GDRIVE_SPEED_SUFFIX)?;

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

    const LISTING: &str = "\
Id                                  Name            Type   Size      Created
1AbCdEf                             Temp_10M.txt    bin    10.5 MB   2019-09-20 10:00:00
";

    fn job_in(dir: &TempDir) -> TransferJob {
        let job = TransferJob::from_entry("Temp_10M.txt", Some(dir.path())).unwrap();
        std::fs::write(&job.local_path, vec![0u8; 10_500_000]).unwrap();
        job
    }

    #[tokio::test]
    async fn test_upload_deletes_by_id_before_upload() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("gdrive list", LISTING)
                .respond_after(
                    "gdrive upload",
                    "Uploading Temp_10M.txt\nUploaded 1NewId at 4.2 MB/s, total 10.5 MB\n",
                    Duration::from_secs(3),
                ),
        );
        let backend = GdriveBackend::new(runner.clone(), Direction::Upload);

        backend.cleanup_destination(&job).await.unwrap();
        let measurement = backend.transfer(&job).await.unwrap();

        assert_eq!(runner.calls()[..2], ["gdrive list".to_string(), "gdrive delete 1AbCdEf".to_string()]);
        assert!(runner.position("gdrive delete").unwrap() < runner.position("gdrive upload").unwrap());
        assert!((measurement.values[0] - 3.5).abs() < 1e-9);
        assert!((measurement.values[1] - 4.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_upload_deletes_only_exact_name_matches() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let listing = "\
Id        Name                Type   Size      Created
1B        Temp_10M.txt        bin    10.5 MB   2019-09-20 10:00:00
1A        Temp_10M.txt.bak    bin    10.5 MB   2019-09-19 09:00:00
";
        let runner = Arc::new(ScriptedRunner::new().respond("gdrive list", listing));
        GdriveBackend::new(runner.clone(), Direction::Upload)
            .cleanup_destination(&job)
            .await
            .unwrap();
        assert_eq!(runner.calls(), vec!["gdrive list", "gdrive delete 1B"]);
    }

    #[tokio::test]
    async fn test_upload_deletes_every_duplicate() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let listing = "\
Id        Name            Type   Size      Created
1B        Temp_10M.txt    bin    10.5 MB   2019-09-20 10:00:00
1C        Temp_10M.txt    bin    10.5 MB   2019-09-21 10:00:00
";
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("gdrive list", listing)
                .respond("gdrive upload", "Uploaded 1New at 1.0 MB/s, total 10.5 MB\n"),
        );
        let backend = GdriveBackend::new(runner.clone(), Direction::Upload);
        backend.cleanup_destination(&job).await.unwrap();
        backend.transfer(&job).await.unwrap();

        let calls = runner.calls();
        assert_eq!(calls[1..3], ["gdrive delete 1B".to_string(), "gdrive delete 1C".to_string()]);
        assert!(calls[3].starts_with("gdrive upload "));
    }

    #[tokio::test]
    async fn test_download_ignores_similar_names() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(
            ScriptedRunner::new().respond("gdrive list", "Id    Name\n1A    Temp_10M.txt.bak    bin\n"),
        );
        let err = GdriveBackend::new(runner.clone(), Direction::Download)
            .transfer(&job)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
        assert_eq!(runner.position("gdrive download"), None);
    }

    #[tokio::test]
    async fn test_upload_with_nothing_to_delete() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(ScriptedRunner::new().respond("gdrive list", "Id  Name  Type  Size  Created\n"));
        GdriveBackend::new(runner.clone(), Direction::Upload)
            .cleanup_destination(&job)
            .await
            .unwrap();
        assert_eq!(runner.position("gdrive delete"), None);
    }

    #[tokio::test]
    async fn test_download_resolves_id() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(
            ScriptedRunner::new()
                .respond("gdrive list", LISTING)
                .respond("gdrive download", "Downloading Temp_10M.txt -> Temp_10M.txt\nDownloaded 1AbCdEf at 2.1 MB/s, total 10.5 MB\n"),
        );
        let backend = GdriveBackend::new(runner.clone(), Direction::Download);

        backend.cleanup_destination(&job).await.unwrap();
        assert!(!job.local_path.exists());
        assert_eq!(runner.position("gdrive"), None);

        // Stands in for the file gdrive writes
        std::fs::write(&job.local_path, vec![0u8; 10_500_000]).unwrap();
        let measurement = backend.transfer(&job).await.unwrap();

        let download = runner.calls().into_iter().find(|c| c.starts_with("gdrive download")).unwrap();
        assert!(download.starts_with("gdrive download --force --path "));
        assert!(download.ends_with(" 1AbCdEf"));
        assert!((measurement.values[1] - 2.1).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_download_missing_id_fails() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(ScriptedRunner::new().respond("gdrive list", "Id  Name\n"));
        let err = GdriveBackend::new(runner.clone(), Direction::Download)
            .transfer(&job)
            .await
            .unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
        assert_eq!(runner.position("gdrive download"), None);
    }

    #[tokio::test]
    async fn test_missing_speed_reading_fails() {
        let dir = TempDir::new().unwrap();
        let job = job_in(&dir);
        let runner = Arc::new(ScriptedRunner::new().respond("gdrive upload", "Uploaded\n"));
        let err = GdriveBackend::new(runner, Direction::Upload).transfer(&job).await.unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
    }
}
