//! Output formatting and display system
//!
//! Renders trial progress, run summaries and aggregate tables as plain or
//! colored text.

mod colored;
mod formatter;

pub use colored::{ColorScheme, ColoredFormatter, SpreadLevel};
pub use formatter::{format_duration, Alignment, Column, FormattingOptions, OutputFormatter, PlainFormatter, RowData, TableFormat};

use crate::{
    models::{SizeLabel, TrialRecord},
    stats,
    types::{Direction, Tool},
};
use serde::Serialize;
use std::path::PathBuf;

/// Means of one size label across the trials of a run
#[derive(Debug, Clone, Serialize)]
pub struct LabelSummary {
    pub size_label: SizeLabel,
    pub trials: usize,
    /// One mean per metric column
    pub means: Vec<Option<f64>>,
    pub mean_elapsed_seconds: Option<f64>,
}

/// What a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub tool: Tool,
    pub direction: Direction,
    pub results_path: PathBuf,
    pub columns: Vec<String>,
    pub total_trials: usize,
    pub elapsed_seconds: f64,
    /// In first-seen order
    pub labels: Vec<LabelSummary>,
}

impl RunSummary {
    /// Group records by size label, keeping the order labels first appeared
    pub fn from_records(
        tool: Tool,
        direction: Direction,
        results_path: PathBuf,
        columns: &[&str],
        records: &[(TrialRecord, f64)],
        elapsed_seconds: f64,
    ) -> Self {
        let mut groups: Vec<(SizeLabel, Vec<&TrialRecord>, Vec<f64>)> = Vec::new();

        for (record, elapsed) in records {
            match groups.iter_mut().find(|(label, _, _)| *label == record.size_label) {
                Some((_, members, times)) => {
                    members.push(record);
                    times.push(*elapsed);
                }
                None => groups.push((record.size_label.clone(), vec![record], vec![*elapsed])),
            }
        }

        let labels = groups
            .into_iter()
            .map(|(size_label, members, times)| {
                let means = (0..columns.len())
                    .map(|i| {
                        let values: Vec<f64> = members.iter().filter_map(|r| r.values.get(i).copied()).collect();
                        stats::mean(&values)
                    })
                    .collect();
                LabelSummary {
                    size_label,
                    trials: members.len(),
                    means,
                    mean_elapsed_seconds: stats::mean(&times),
                }
            })
            .collect();

        Self {
            tool,
            direction,
            results_path,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            total_trials: records.len(),
            elapsed_seconds,
            labels,
        }
    }
}

/// Output formatting factory for creating appropriate formatters
pub struct OutputFormatterFactory;

impl OutputFormatterFactory {
    /// Create a formatter based on color support and preferences
    pub fn create_formatter(enable_color: bool, verbose: bool) -> Box<dyn OutputFormatter> {
        let options = FormattingOptions {
            enable_color,
            verbose_mode: verbose,
            ..FormattingOptions::default()
        };

        if enable_color {
            Box::new(ColoredFormatter::new(options))
        } else {
            Box::new(PlainFormatter::new(options))
        }
    }

    /// Plain text formatter for scripts and logs
    pub fn create_plain_formatter() -> Box<dyn OutputFormatter> {
        Self::create_formatter(false, false)
    }
}
