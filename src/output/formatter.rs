//! Core formatting traits and implementations
//!
//! This module defines the output formatting interface and provides
//! a plain text implementation with table formatting capabilities.

use super::RunSummary;
use crate::{
    error::{AppError, Result},
    models::{TransferJob, TrialRecord},
    stats::AggregateRow,
};
use std::fmt::Write as _;

/// Main trait for output formatting
pub trait OutputFormatter {
    /// Format a header section
    fn format_header(&self, title: &str) -> Result<String>;

    /// One progress line per completed trial
    fn format_trial_result(&self, job: &TransferJob, trial: u32, total: u32, columns: &[&str], record: &TrialRecord) -> Result<String>;

    /// Per-label means of a finished run
    fn format_run_summary(&self, summary: &RunSummary) -> Result<String>;

    /// Mean and standard error per nominal size
    fn format_aggregate_table(&self, rows: &[AggregateRow]) -> Result<String>;

    fn format_error(&self, error: &str) -> Result<String>;

    fn format_warning(&self, warning: &str) -> Result<String>;

    fn format_success(&self, message: &str) -> Result<String>;
}

/// Configuration options for formatting
#[derive(Debug, Clone)]
pub struct FormattingOptions {
    pub enable_color: bool,
    /// Show elapsed time and per-trial detail
    pub verbose_mode: bool,
    pub table_borders: bool,
    /// Decimal places for speeds
    pub precision: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        Self {
            enable_color: true,
            verbose_mode: false,
            table_borders: true,
            precision: 3,
        }
    }
}

/// Table formatting configuration
#[derive(Debug, Clone)]
pub struct TableFormat {
    pub columns: Vec<Column>,
    pub show_borders: bool,
    pub show_header: bool,
}

/// Column definition for table formatting
#[derive(Debug, Clone)]
pub struct Column {
    pub header: String,
    pub alignment: Alignment,
    pub min_width: usize,
}

impl Column {
    pub fn left(header: &str) -> Self {
        Self {
            header: header.to_string(),
            alignment: Alignment::Left,
            min_width: 4,
        }
    }

    pub fn right(header: &str) -> Self {
        Self {
            header: header.to_string(),
            alignment: Alignment::Right,
            min_width: 8,
        }
    }
}

/// Text alignment options
#[derive(Debug, Clone)]
pub enum Alignment {
    Left,
    Right,
}

/// Row data for table formatting
pub type RowData = Vec<String>;

fn fmt_err(e: std::fmt::Error) -> AppError {
    AppError::internal(format!("Failed to format output: {}", e))
}

/// Plain text formatter implementation
pub struct PlainFormatter {
    options: FormattingOptions,
}

impl PlainFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &FormattingOptions {
        &self.options
    }

    /// Render rows under the given columns
    pub fn create_table(&self, format: &TableFormat, rows: &[RowData]) -> String {
        if rows.is_empty() {
            return String::new();
        }

        let widths = self.calculate_column_widths(format, rows);
        let mut output = String::new();

        if format.show_header && !format.columns.is_empty() {
            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&widths));
                output.push('\n');
            }

            let headers: Vec<String> = format.columns.iter().map(|c| c.header.clone()).collect();
            output.push_str(&self.create_row(&headers, &widths, format));
            output.push('\n');

            if format.show_borders {
                output.push_str(&self.create_horizontal_border(&widths));
                output.push('\n');
            }
        }

        for row in rows {
            output.push_str(&self.create_row(row, &widths, format));
            output.push('\n');
        }

        if format.show_borders {
            output.push_str(&self.create_horizontal_border(&widths));
            output.push('\n');
        }

        output
    }

    fn calculate_column_widths(&self, format: &TableFormat, rows: &[RowData]) -> Vec<usize> {
        let num_columns = format
            .columns
            .len()
            .max(rows.iter().map(|r| r.len()).max().unwrap_or(0));

        (0..num_columns)
            .map(|idx| {
                let base = format
                    .columns
                    .get(idx)
                    .map_or(0, |c| c.min_width.max(c.header.chars().count()));
                rows.iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .fold(base, usize::max)
            })
            .collect()
    }

    fn create_row(&self, data: &[String], widths: &[usize], format: &TableFormat) -> String {
        let mut row = String::new();

        if format.show_borders {
            row.push('|');
        }

        for (idx, (cell, &width)) in data.iter().zip(widths.iter()).enumerate() {
            let alignment = format.columns.get(idx).map_or(&Alignment::Left, |c| &c.alignment);

            if format.show_borders {
                row.push(' ');
            }
            row.push_str(&align_text(cell, width, alignment));
            if format.show_borders {
                row.push_str(" |");
            } else {
                row.push_str("  ");
            }
        }

        row.trim_end().to_string()
    }

    fn create_horizontal_border(&self, widths: &[usize]) -> String {
        let mut border = String::from("+");
        for &width in widths {
            border.push_str(&"-".repeat(width + 2));
            border.push('+');
        }
        border
    }

    fn table_format(&self, columns: Vec<Column>) -> TableFormat {
        TableFormat {
            columns,
            show_borders: self.options.table_borders,
            show_header: true,
        }
    }

    pub fn format_speed(&self, value: f64) -> String {
        format!("{:.*}", self.options.precision, value)
    }

    fn format_optional(&self, value: Option<f64>) -> String {
        value.map_or_else(|| "-".to_string(), |v| self.format_speed(v))
    }

    /// Cells of the run summary table
    pub fn summary_rows(&self, summary: &RunSummary) -> (Vec<Column>, Vec<RowData>) {
        let mut columns = vec![Column::left("FileSize"), Column::right("Trials")];
        columns.extend(summary.columns.iter().map(|c| Column::right(&format!("Mean {}", c))));
        if self.options.verbose_mode {
            columns.push(Column::right("Mean Elapsed (s)"));
        }

        let rows = summary
            .labels
            .iter()
            .map(|label| {
                let mut row = vec![label.size_label.to_string(), label.trials.to_string()];
                row.extend(label.means.iter().map(|m| self.format_optional(*m)));
                if self.options.verbose_mode {
                    row.push(self.format_optional(label.mean_elapsed_seconds));
                }
                row
            })
            .collect();

        (columns, rows)
    }

    /// Cells of the aggregate table
    pub fn aggregate_rows(&self, rows: &[AggregateRow]) -> (Vec<Column>, Vec<RowData>) {
        let columns = vec![
            Column::left("FileSize"),
            Column::right("Samples"),
            Column::right("Mean MB/s"),
            Column::right("Std Error"),
        ];

        let data = rows
            .iter()
            .map(|row| {
                vec![
                    row.size_label.clone(),
                    row.samples.to_string(),
                    self.format_optional(row.mean),
                    self.format_optional(row.standard_error),
                ]
            })
            .collect();

        (columns, data)
    }

    pub fn trial_line(&self, job: &TransferJob, trial: u32, total: u32, columns: &[&str], record: &TrialRecord) -> String {
        let values: Vec<String> = columns
            .iter()
            .zip(&record.values)
            .map(|(name, value)| format!("{}={}", name, self.format_speed(*value)))
            .collect();
        format!("{} [{}/{}] {}", job.file_name, trial, total, values.join(" "))
    }
}

fn align_text(text: &str, width: usize, alignment: &Alignment) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }

    let padding = " ".repeat(width - len);
    match alignment {
        Alignment::Left => format!("{}{}", text, padding),
        Alignment::Right => format!("{}{}", padding, text),
    }
}

/// Human-readable elapsed time
pub fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{:.2}s", seconds)
    } else if seconds < 3600.0 {
        let minutes = (seconds / 60.0) as u32;
        format!("{}m{:.1}s", minutes, seconds % 60.0)
    } else {
        let hours = (seconds / 3600.0) as u32;
        let minutes = ((seconds % 3600.0) / 60.0) as u32;
        format!("{}h{}m", hours, minutes)
    }
}

impl OutputFormatter for PlainFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let mut output = String::new();
        let border = "=".repeat(title.chars().count() + 4);

        writeln!(output, "{}", border).map_err(fmt_err)?;
        writeln!(output, "  {}  ", title).map_err(fmt_err)?;
        write!(output, "{}", border).map_err(fmt_err)?;

        Ok(output)
    }

    fn format_trial_result(&self, job: &TransferJob, trial: u32, total: u32, columns: &[&str], record: &TrialRecord) -> Result<String> {
        Ok(self.trial_line(job, trial, total, columns, record))
    }

    fn format_run_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut output = String::new();

        writeln!(output, "Run Summary:").map_err(fmt_err)?;
        writeln!(output, "------------").map_err(fmt_err)?;
        writeln!(output, "Tool:          {} ({})", summary.tool, summary.direction).map_err(fmt_err)?;
        writeln!(output, "Trials:        {}", summary.total_trials).map_err(fmt_err)?;
        writeln!(output, "Duration:      {}", format_duration(summary.elapsed_seconds)).map_err(fmt_err)?;
        writeln!(output, "Results File:  {}", summary.results_path.display()).map_err(fmt_err)?;

        let (columns, rows) = self.summary_rows(summary);
        if !rows.is_empty() {
            output.push('\n');
            output.push_str(&self.create_table(&self.table_format(columns), &rows));
        }

        Ok(output)
    }

    fn format_aggregate_table(&self, rows: &[AggregateRow]) -> Result<String> {
        if rows.is_empty() {
            return Ok("No rows to aggregate".to_string());
        }
        let (columns, data) = self.aggregate_rows(rows);
        Ok(self.create_table(&self.table_format(columns), &data))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("ERROR: {}", error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("WARNING: {}", warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("SUCCESS: {}", message))
    }
}
