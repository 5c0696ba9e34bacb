//! Trial records and file-size labels

use crate::types::{AppError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;

/// Column name of the size label in every results file
pub const FILE_SIZE_COLUMN: &str = "FileSize";

fn embedded_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[0-9]+[BKMG]").expect("valid size label regex"))
}

fn exact_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]+[BKMG]$").expect("valid size label regex"))
}

/// Nominal file size tag such as `10M` or `1G`
///
/// Grammar: one or more digits followed by one of `B`, `K`, `M`, `G`.
/// Units are upper case only. The byte count is checked on construction, so
/// labels whose size does not fit in a `u64` are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SizeLabel {
    label: String,
    bytes: u64,
}

impl SizeLabel {
    /// Parse an exact label (`10M`), rejecting anything else
    pub fn parse(label: &str) -> Result<Self> {
        let label = label.trim();
        if !exact_label_pattern().is_match(label) {
            return Err(AppError::validation(format!(
                "'{}' is not a file size label (expected digits followed by B, K, M or G)",
                label
            )));
        }
        Self::checked(label)
    }

    /// Find the first size label embedded in a file name
    ///
    /// `Temp_10M_irods.txt` yields `10M`; `run2b_Temp_10M.txt` also yields
    /// `10M` since lowercase units are not labels.
    pub fn from_filename(filename: &str) -> Result<Self> {
        let found = embedded_label_pattern().find(filename).ok_or_else(|| {
            AppError::validation(format!(
                "File size required in dummy filename '{}' (e.g. Temp_10M.txt)",
                filename
            ))
        })?;
        Self::checked(found.as_str())
    }

    fn checked(label: &str) -> Result<Self> {
        let (digits, unit) = label.split_at(label.len() - 1);
        let multiplier: u64 = match unit {
            "K" => 1_000,
            "M" => 1_000_000,
            "G" => 1_000_000_000,
            _ => 1,
        };
        let bytes = digits
            .parse::<u64>()
            .ok()
            .and_then(|count| count.checked_mul(multiplier))
            .ok_or_else(|| AppError::validation(format!("File size label '{}' is too large", label)))?;

        Ok(Self {
            label: label.to_string(),
            bytes,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.label
    }

    /// Nominal size in bytes using decimal multipliers
    pub fn bytes(&self) -> u64 {
        self.bytes
    }
}

/// Decimal SI multiplier for a unit prefix (`""`/`B`, `K`, `M`, `G`)
pub fn unit_multiplier(prefix: &str) -> Option<f64> {
    match prefix {
        "" | "B" => Some(1.0),
        "K" => Some(1e3),
        "M" => Some(1e6),
        "G" => Some(1e9),
        _ => None,
    }
}

impl fmt::Display for SizeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

impl FromStr for SizeLabel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for SizeLabel {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<SizeLabel> for String {
    fn from(label: SizeLabel) -> Self {
        label.label
    }
}

/// One dummy file to transfer repeatedly
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferJob {
    /// Bare file name, used on the remote side
    pub file_name: String,
    /// Full path of the file on the benchmarking machine
    pub local_path: PathBuf,
    /// Nominal size parsed from the file name
    pub size_label: SizeLabel,
}

impl TransferJob {
    /// Build a job from a configured dummy file entry
    ///
    /// Entries may be bare names (resolved against `local_directory`) or paths.
    pub fn from_entry(entry: &str, local_directory: Option<&Path>) -> Result<Self> {
        let entry_path = Path::new(entry.trim());
        let file_name = entry_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AppError::validation(format!("Dummy file entry '{}' has no file name", entry)))?
            .to_string();

        let size_label = SizeLabel::from_filename(&file_name)?;

        let local_path = match local_directory {
            Some(dir) if entry_path.parent().map_or(true, |p| p.as_os_str().is_empty()) => dir.join(&file_name),
            _ => entry_path.to_path_buf(),
        };

        Ok(Self {
            file_name,
            local_path,
            size_label,
        })
    }

    /// Directory containing the local copy
    pub fn local_directory(&self) -> PathBuf {
        self.local_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Values measured for one trial, in the order of the backend's metric columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialMeasurement {
    /// Speeds in MB/s
    pub values: Vec<f64>,
    /// Wall-clock time of the transfer command
    pub elapsed_seconds: f64,
}

/// One row of a results file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub size_label: SizeLabel,
    pub values: Vec<f64>,
}

impl TrialRecord {
    pub fn new(size_label: SizeLabel, values: Vec<f64>) -> Self {
        Self { size_label, values }
    }

    /// CSV cells for this row
    pub fn to_row(&self) -> Vec<String> {
        std::iter::once(self.size_label.to_string())
            .chain(self.values.iter().map(|v| v.to_string()))
            .collect()
    }
}
