//! Append-only results file
//!
//! The file is truncated and given its header once per run; afterwards each
//! trial opens it in append mode, writes one row, flushes and closes it, so a
//! crash can only lose the trial in flight.

use crate::error::{AppError, ErrorContext, Result};
use crate::models::{TrialRecord, FILE_SIZE_COLUMN};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

/// Writer for one results CSV
#[derive(Debug, Clone)]
pub struct ResultWriter {
    path: PathBuf,
    header: Vec<String>,
}

impl ResultWriter {
    /// Truncate (or create) `path` and write `FileSize,<metric columns...>`
    pub fn create<P: AsRef<Path>>(path: P, metric_columns: &[&str]) -> Result<Self> {
        if metric_columns.is_empty() {
            return Err(AppError::validation("A results file needs at least one metric column"));
        }

        let path = path.as_ref().to_path_buf();
        let header: Vec<String> = std::iter::once(FILE_SIZE_COLUMN)
            .chain(metric_columns.iter().copied())
            .map(str::to_string)
            .collect();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Creating directory {}", parent.display()))?;
        }

        let file = File::create(&path).with_context(|| format!("Creating {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&header)?;
        writer.flush()?;

        Ok(Self { path, header })
    }

    /// Append one trial row and close the file again
    pub fn append(&self, record: &TrialRecord) -> Result<()> {
        let row = record.to_row();
        if row.len() != self.header.len() {
            return Err(AppError::validation(format!(
                "Trial row has {} columns but {} expects {}",
                row.len(),
                self.path.display(),
                self.header.len()
            )));
        }

        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .with_context(|| format!("Opening {} for append", self.path.display()))?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
        writer.write_record(&row)?;
        writer.flush()?;

        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }
}
