//! Per-size aggregation of finished benchmark runs
//!
//! A results CSV holds one row per trial. The [`Aggregator`] groups those rows
//! by file-size label and reports, for every label of the nominal size table
//! and in table order, the mean speed and its standard error.


use crate::error::{AppError, ErrorContext, Result};
use crate::models::FILE_SIZE_COLUMN;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Header of an aggregate CSV
pub const AGGREGATE_HEADER: [&str; 3] = ["FileSize", "Speed_Mean", "Speed_SE"];

/// Suffix appended to the input stem for the default aggregate output
pub const AGGREGATE_SUFFIX: &str = "_means.csv";

/// Assumed true sizes of the dummy files, in MB
///
/// The dummy files are somewhat larger than their labels suggest, so speeds
/// derived from elapsed time divide by these rather than by the label value.
const DEFAULT_NOMINAL_SIZES_MB: [(&str, f64); 6] = [
    ("1M", 1.0),
    ("10M", 10.5),
    ("100M", 104.9),
    ("1G", 1100.0),
    ("10G", 10700.0),
    ("100G", 107400.0),
];

/// Ordered mapping from size label to nominal size in MB
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NominalSizeTable {
    entries: Vec<(String, f64)>,
}

impl Default for NominalSizeTable {
    fn default() -> Self {
        Self {
            entries: DEFAULT_NOMINAL_SIZES_MB
                .iter()
                .map(|(label, mb)| (label.to_string(), *mb))
                .collect(),
        }
    }
}

impl NominalSizeTable {
    /// Build a table from `(label, megabytes)` pairs; order is preserved
    pub fn new<I, S>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = Vec::new();
        for (label, mb) in entries {
            let label = label.into();
            if !(mb > 0.0 && mb.is_finite()) {
                return Err(AppError::validation(format!(
                    "Nominal size for '{}' must be positive, got {}",
                    label, mb
                )));
            }
            if table.iter().any(|(existing, _): &(String, f64)| *existing == label) {
                return Err(AppError::validation(format!("Duplicate nominal size label '{}'", label)));
            }
            table.push((label, mb));
        }
        if table.is_empty() {
            return Err(AppError::validation("Nominal size table cannot be empty"));
        }
        Ok(Self { entries: table })
    }

    pub fn nominal_mb(&self, label: &str) -> Option<f64> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, mb)| *mb)
    }

    pub fn contains(&self, label: &str) -> bool {
        self.nominal_mb(label).is_some()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What the raw value column holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    /// Speeds in MB/s, aggregated as-is
    #[default]
    Speed,
    /// Elapsed seconds, converted to nominal MB / seconds
    ElapsedSeconds,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKind::Speed => write!(f, "speed"),
            ValueKind::ElapsedSeconds => write!(f, "elapsed-seconds"),
        }
    }
}

impl FromStr for ValueKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "speed" => Ok(ValueKind::Speed),
            "elapsed-seconds" | "elapsed" | "seconds" | "time" => Ok(ValueKind::ElapsedSeconds),
            other => Err(AppError::validation(format!(
                "Unknown value kind '{}'. Valid kinds: speed, elapsed-seconds",
                other
            ))),
        }
    }
}

/// Aggregate for one size label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    pub size_label: String,
    /// Mean speed in MB/s; `None` when the label had no samples
    pub mean: Option<f64>,
    /// Standard error of the mean; `None` when the label had no samples
    pub standard_error: Option<f64>,
    pub samples: usize,
}

impl AggregateRow {
    fn from_speeds(size_label: &str, speeds: &[f64]) -> Self {
        let (mean, standard_error) = match speeds.len() {
            0 => (None, None),
            1 => (Some(speeds[0]), Some(0.0)),
            _ => (mean(speeds), standard_error(speeds)),
        };
        Self {
            size_label: size_label.to_string(),
            mean,
            standard_error,
            samples: speeds.len(),
        }
    }

    /// CSV fields; missing statistics become empty strings
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.size_label.clone(),
            self.mean.map(|v| v.to_string()).unwrap_or_default(),
            self.standard_error.map(|v| v.to_string()).unwrap_or_default(),
        ]
    }
}

/// Groups raw trial values by size label and summarizes them
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    table: NominalSizeTable,
    kind: ValueKind,
}

impl Aggregator {
    pub fn new(table: NominalSizeTable, kind: ValueKind) -> Self {
        Self { table, kind }
    }

    pub fn with_kind(kind: ValueKind) -> Self {
        Self::new(NominalSizeTable::default(), kind)
    }

    pub fn table(&self) -> &NominalSizeTable {
        &self.table
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Convert one raw value of `label` to MB/s
    fn to_speed(&self, label: &str, value: f64) -> Result<f64> {
        let nominal = self.table.nominal_mb(label).ok_or_else(|| {
            AppError::statistics(format!(
                "Unknown file size label '{}'. Known labels: {}",
                label,
                self.table.labels().collect::<Vec<_>>().join(", ")
            ))
        })?;

        match self.kind {
            ValueKind::Speed => Ok(value),
            ValueKind::ElapsedSeconds if value > 0.0 => Ok(nominal / value),
            ValueKind::ElapsedSeconds => Err(AppError::statistics(format!(
                "Elapsed time for '{}' must be positive, got {}",
                label, value
            ))),
        }
    }

    /// Aggregate `(label, raw value)` pairs
    ///
    /// Returns one row per table label, in table order, whether or not any
    /// sample exists for it. A label missing from the table is an error.
    pub fn aggregate_values<'a, I>(&self, values: I) -> Result<Vec<AggregateRow>>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut groups: HashMap<&str, Vec<f64>> = HashMap::new();
        for (label, value) in values {
            let speed = self.to_speed(label, value)?;
            let key = self.table.labels().find(|l| *l == label).unwrap_or_default();
            groups.entry(key).or_default().push(speed);
        }

        Ok(self
            .table
            .labels()
            .map(|label| {
                let speeds = groups.get(label).map(Vec::as_slice).unwrap_or(&[]);
                AggregateRow::from_speeds(label, speeds)
            })
            .collect())
    }

    /// Read a results CSV and aggregate one of its value columns
    ///
    /// `column` defaults to the first column after `FileSize`. Blank values
    /// are skipped.
    pub fn aggregate_file<P: AsRef<Path>>(&self, path: P, column: Option<&str>) -> Result<Vec<AggregateRow>> {
        let path = path.as_ref();
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .with_context(|| format!("Reading {}", path.display()))?;

        let headers = reader.headers()?.clone();
        let label_index = headers
            .iter()
            .position(|h| h == FILE_SIZE_COLUMN)
            .ok_or_else(|| {
                AppError::parse(format!("{} has no '{}' column", path.display(), FILE_SIZE_COLUMN))
            })?;
        let value_index = match column {
            Some(name) => headers.iter().position(|h| h == name).ok_or_else(|| {
                AppError::parse(format!(
                    "{} has no '{}' column. Available: {}",
                    path.display(),
                    name,
                    headers.iter().collect::<Vec<_>>().join(", ")
                ))
            })?,
            None => (0..headers.len()).find(|i| *i != label_index).ok_or_else(|| {
                AppError::parse(format!("{} has no value column", path.display()))
            })?,
        };

        let mut samples: Vec<(String, f64)> = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let label = record.get(label_index).unwrap_or_default();
            let raw = record.get(value_index).unwrap_or_default();
            if raw.is_empty() {
                continue;
            }
            let value: f64 = raw.parse().map_err(|e| {
                AppError::parse(format!(
                    "{} row {}: value '{}' is not a number: {}",
                    path.display(),
                    line + 2,
                    raw,
                    e
                ))
            })?;
            samples.push((label.to_string(), value));
        }

        self.aggregate_values(samples.iter().map(|(l, v)| (l.as_str(), *v)))
    }
}

/// Write aggregate rows as `FileSize,Speed_Mean,Speed_SE`
pub fn write_aggregate<P: AsRef<Path>>(path: P, rows: &[AggregateRow]) -> Result<()> {
    let path = path.as_ref();
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Creating {}", path.display()))?;
    writer.write_record(AGGREGATE_HEADER)?;
    for row in rows {
        writer.write_record(row.to_row())?;
    }
    writer.flush()?;
    Ok(())
}

/// `results.csv` → `results_means.csv`, next to the input
pub fn default_output_path<P: AsRef<Path>>(input: P) -> PathBuf {
    let input = input.as_ref();
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = file_name.strip_suffix(".csv").unwrap_or(&file_name);
    input.with_file_name(format!("{}{}", stem, AGGREGATE_SUFFIX))
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Sample standard deviation (n - 1 denominator); needs two or more values
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let sum_sq = values.iter().map(|v| (v - m).powi(2)).sum::<f64>();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Standard error of the mean, `s / sqrt(n)`
pub fn standard_error(values: &[f64]) -> Option<f64> {
    sample_std_dev(values).map(|s| s / (values.len() as f64).sqrt())
}
