//! Colored formatter implementation with terminal color support

use super::formatter::{format_duration, FormattingOptions, OutputFormatter, PlainFormatter, TableFormat};
use super::RunSummary;
use crate::{
    error::Result,
    models::{TransferJob, TrialRecord},
    stats::AggregateRow,
};
use colored::*;

/// How tightly the trials of one size agree, by relative standard error
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpreadLevel {
    /// Standard error under 5% of the mean
    Tight,
    /// Under 15%
    Moderate,
    Wide,
    /// Too few samples to tell
    Unknown,
}

impl SpreadLevel {
    pub fn classify(mean: Option<f64>, standard_error: Option<f64>, samples: usize) -> Self {
        match (mean, standard_error) {
            (Some(mean), Some(se)) if samples > 1 && mean > 0.0 => {
                let relative = se / mean;
                if relative < 0.05 {
                    Self::Tight
                } else if relative < 0.15 {
                    Self::Moderate
                } else {
                    Self::Wide
                }
            }
            _ => Self::Unknown,
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Tight => Color::Green,
            Self::Moderate => Color::Yellow,
            Self::Wide => Color::Red,
            Self::Unknown => Color::BrightBlack,
        }
    }
}

/// Color scheme configuration
#[derive(Debug, Clone)]
pub struct ColorScheme {
    pub header: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub highlight: Color,
    pub border: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            header: Color::Blue,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Cyan,
            highlight: Color::Magenta,
            border: Color::BrightBlack,
        }
    }
}

/// Decorates the plain layout; cell padding is computed on uncolored text
/// and color is applied per line afterwards
pub struct ColoredFormatter {
    plain: PlainFormatter,
    options: FormattingOptions,
    color_scheme: ColorScheme,
}

impl ColoredFormatter {
    pub fn new(options: FormattingOptions) -> Self {
        Self::with_color_scheme(options, ColorScheme::default())
    }

    pub fn with_color_scheme(options: FormattingOptions, color_scheme: ColorScheme) -> Self {
        Self {
            plain: PlainFormatter::new(options.clone()),
            options,
            color_scheme,
        }
    }

    fn colorize(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.color(color)
        } else {
            text.normal()
        }
    }

    fn bold(&self, text: &str) -> ColoredString {
        if self.options.enable_color {
            text.bold()
        } else {
            text.normal()
        }
    }

    fn bold_colored(&self, text: &str, color: Color) -> ColoredString {
        if self.options.enable_color {
            text.bold().color(color)
        } else {
            text.normal()
        }
    }

    /// Color borders, bold the header row, and tint body rows via `row_color`
    fn paint_table<F>(&self, table: &str, row_color: F) -> String
    where
        F: Fn(usize) -> Option<Color>,
    {
        let mut body_index = 0;
        let mut seen_header = false;

        table
            .lines()
            .map(|line| {
                if line.starts_with('+') {
                    return self.colorize(line, self.color_scheme.border).to_string();
                }
                if !seen_header {
                    seen_header = true;
                    return self.bold(line).to_string();
                }
                let painted = match row_color(body_index) {
                    Some(color) => self.colorize(line, color).to_string(),
                    None => line.to_string(),
                };
                body_index += 1;
                painted
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table(&self, columns: Vec<super::formatter::Column>, rows: &[Vec<String>]) -> String {
        let format = TableFormat {
            columns,
            show_borders: self.options.table_borders,
            show_header: true,
        };
        self.plain.create_table(&format, rows)
    }
}

impl OutputFormatter for ColoredFormatter {
    fn format_header(&self, title: &str) -> Result<String> {
        let border = "=".repeat(title.chars().count() + 4);
        Ok(format!(
            "{}\n  {}  \n{}",
            self.colorize(&border, self.color_scheme.header),
            self.bold_colored(title, self.color_scheme.header),
            self.colorize(&border, self.color_scheme.header)
        ))
    }

    fn format_trial_result(&self, job: &TransferJob, trial: u32, total: u32, columns: &[&str], record: &TrialRecord) -> Result<String> {
        let values: Vec<String> = columns
            .iter()
            .zip(&record.values)
            .map(|(name, value)| {
                format!(
                    "{}={}",
                    name,
                    self.colorize(&self.plain.format_speed(*value), self.color_scheme.highlight)
                )
            })
            .collect();

        Ok(format!(
            "{} {} {}",
            self.bold(&job.file_name),
            self.colorize(&format!("[{}/{}]", trial, total), self.color_scheme.info),
            values.join(" ")
        ))
    }

    fn format_run_summary(&self, summary: &RunSummary) -> Result<String> {
        let mut lines = vec![
            self.bold_colored("Run Summary:", self.color_scheme.header).to_string(),
            format!(
                "Tool:          {} ({})",
                self.colorize(summary.tool.as_str(), self.color_scheme.info),
                summary.direction
            ),
            format!("Trials:        {}", summary.total_trials),
            format!("Duration:      {}", format_duration(summary.elapsed_seconds)),
            format!(
                "Results File:  {}",
                self.colorize(&summary.results_path.display().to_string(), self.color_scheme.success)
            ),
        ];

        let (columns, rows) = self.plain.summary_rows(summary);
        if !rows.is_empty() {
            lines.push(String::new());
            lines.push(self.paint_table(&self.table(columns, &rows), |_| None));
        }

        Ok(lines.join("\n"))
    }

    fn format_aggregate_table(&self, rows: &[AggregateRow]) -> Result<String> {
        if rows.is_empty() {
            return Ok(self.colorize("No rows to aggregate", self.color_scheme.warning).to_string());
        }

        let levels: Vec<SpreadLevel> = rows
            .iter()
            .map(|r| SpreadLevel::classify(r.mean, r.standard_error, r.samples))
            .collect();
        let (columns, data) = self.plain.aggregate_rows(rows);

        Ok(self.paint_table(&self.table(columns, &data), |i| levels.get(i).map(SpreadLevel::color)))
    }

    fn format_error(&self, error: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold_colored("ERROR:", self.color_scheme.error), error))
    }

    fn format_warning(&self, warning: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold_colored("WARNING:", self.color_scheme.warning), warning))
    }

    fn format_success(&self, message: &str) -> Result<String> {
        Ok(format!("{} {}", self.bold_colored("SUCCESS:", self.color_scheme.success), message))
    }
}
