//! Parsers for transfer tool output
//!
//! Every function here is a strict contract on one output format: when the
//! expected field or reading is missing the caller gets an
//! [`AppError::Extraction`] rather than a default value.
//!
//! Formats understood:
//! - `label : value` reports (`globus transfer`, `globus delete`,
//!   `globus task show`): first line whose label matches wins, whitespace is
//!   stripped from the value.
//! - speed readings `<number> <K|M|G|>B/<suffix>` (`gdrive` uses `B/s`,
//!   `duck` prints `B/sec` repeatedly while transferring).
//! - `globus ls` / `rclone lsf` listings: one entry per line.
//! - `gdrive list` tables: columns padded with two or more spaces; the file
//!   id is the first column and the name must match the second exactly.

use crate::error::{AppError, Result};
use crate::models::trial::unit_multiplier;
use regex::Regex;
use std::sync::OnceLock;


/// Field printed by `globus transfer` and `globus delete`
pub const TASK_ID_FIELD: &str = "Task ID";

/// Field printed by `globus task show`
pub const BYTES_PER_SECOND_FIELD: &str = "Bytes Per Second";

/// Suffix of the speed readings printed by `gdrive`
pub const GDRIVE_SPEED_SUFFIX: &str = "s";

/// Suffix of the speed readings printed by `duck`
pub const DUCK_SPEED_SUFFIX: &str = "sec";

/// Find `label` in a `label : value` report and return its value with all
/// whitespace removed
pub fn extract_field(text: &str, label: &str) -> Result<String> {
    let wanted = label.trim();
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim() == wanted)
        .map(|(_, value)| value.chars().filter(|c| !c.is_whitespace()).collect::<String>())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::extraction(format!("Field '{}' not found in command output", wanted)))
}

/// Like [`extract_field`] but parses the value as a number
pub fn extract_numeric_field(text: &str, label: &str) -> Result<f64> {
    let raw = extract_field(text, label)?;
    raw.parse::<f64>()
        .map_err(|e| AppError::extraction(format!("Field '{}' has non-numeric value '{}': {}", label, raw, e)))
}

fn speed_pattern(suffix: &str) -> Result<Regex> {
    let pattern = format!(r"([0-9]+(?:\.[0-9]*)?|\.[0-9]+)\s([KMG]?)B/{}\b", regex::escape(suffix));
    Regex::new(&pattern).map_err(|e| AppError::internal(format!("Invalid speed pattern: {}", e)))
}

/// Every speed reading in `text`, converted to MB/s
pub fn parse_speed_readings(text: &str, suffix: &str) -> Result<Vec<f64>> {
    let pattern = speed_pattern(suffix)?;
    let mut readings = Vec::new();

    for captures in pattern.captures_iter(text) {
        let number = &captures[1];
        let prefix = &captures[2];
        let value: f64 = number
            .parse()
            .map_err(|e| AppError::extraction(format!("Unreadable speed value '{}': {}", number, e)))?;
        let multiplier = unit_multiplier(prefix)
            .ok_or_else(|| AppError::extraction(format!("Unknown unit prefix '{}'", prefix)))?;
        readings.push(value * multiplier / 1e6);
    }

    Ok(readings)
}

/// Arithmetic mean of all speed readings in `text`, in MB/s
pub fn mean_speed_reading(text: &str, suffix: &str) -> Result<f64> {
    let readings = parse_speed_readings(text, suffix)?;
    if readings.is_empty() {
        return Err(AppError::extraction(format!("No 'B/{}' speed readings in command output", suffix)));
    }
    Ok(readings.iter().sum::<f64>() / readings.len() as f64)
}

/// First speed reading in `text`, in MB/s
pub fn first_speed_reading(text: &str, suffix: &str) -> Result<f64> {
    parse_speed_readings(text, suffix)?
        .into_iter()
        .next()
        .ok_or_else(|| AppError::extraction(format!("No 'B/{}' speed reading in command output", suffix)))
}

/// Whether a one-entry-per-line listing contains exactly `name`
pub fn listing_contains(listing: &str, name: &str) -> bool {
    listing.lines().any(|line| line.trim() == name)
}

fn column_separator() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\s{2,}|\t").expect("valid column separator regex"))
}

/// Ids of every `gdrive list` row whose Name column is exactly `name`
///
/// `gdrive list` pads its `Id Name Type Size Created` columns with at least
/// two spaces. The header row is skipped and listing order is kept.
pub fn gdrive_file_ids(listing: &str, name: &str) -> Vec<String> {
    listing
        .lines()
        .filter_map(|line| {
            let mut columns = column_separator().split(line.trim());
            let id = columns.next()?;
            let row_name = columns.next()?;
            (id != "Id" && row_name == name).then(|| id.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLOBUS_TRANSFER: &str = "Message: The transfer has been accepted and a task has been created and queued for execution\nTask ID: abc123\n";

    const GLOBUS_TASK_SHOW: &str = "\
Label:                        None
Task ID:                      abc123
Is Paused:                    False
Type:                         TRANSFER
Status:                       SUCCEEDED
Bytes Transferred:            10485760
Bytes Per Second:             5000000
";

    #[test]
    fn test_extract_task_id_and_rate() {
        let log = "Task ID: abc123\nBytes Per Second: 5000000\n";
        assert_eq!(extract_field(log, TASK_ID_FIELD).unwrap(), "abc123");
        assert_eq!(extract_field(log, BYTES_PER_SECOND_FIELD).unwrap(), "5000000");
    }

    #[test]
    fn test_extract_from_realistic_reports() {
        assert_eq!(extract_field(GLOBUS_TRANSFER, TASK_ID_FIELD).unwrap(), "abc123");
        assert_eq!(extract_numeric_field(GLOBUS_TASK_SHOW, BYTES_PER_SECOND_FIELD).unwrap(), 5_000_000.0);
        assert_eq!(extract_field(GLOBUS_TASK_SHOW, "Status").unwrap(), "SUCCEEDED");
    }

    #[test]
    fn test_extract_strips_internal_whitespace() {
        assert_eq!(extract_field("Name :  a b\tc  \n", "Name").unwrap(), "abc");
    }

    #[test]
    fn test_extract_first_match_wins() {
        let text = "Task ID: first\nTask ID: second\n";
        assert_eq!(extract_field(text, TASK_ID_FIELD).unwrap(), "first");
    }

    #[test]
    fn test_extract_absent_label_fails() {
        let err = extract_field("Message: nothing here\n", TASK_ID_FIELD).unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
        assert!(extract_field("", TASK_ID_FIELD).is_err());
        // Label must match exactly, not as a prefix
        assert!(extract_field("Task IDs: x\n", TASK_ID_FIELD).is_err());
    }

    #[test]
    fn test_extract_empty_value_fails() {
        assert!(extract_field("Task ID:   \n", TASK_ID_FIELD).is_err());
    }

    #[test]
    fn test_numeric_field_rejects_text() {
        let err = extract_numeric_field("Bytes Per Second: fast\n", BYTES_PER_SECOND_FIELD).unwrap_err();
        assert_eq!(err.category(), "EXTRACT");
    }

    #[test]
    fn test_speed_readings_decimal_units() {
        let text = "1.5 MB/sec\n500.0 KB/sec\n0.002 GB/sec\n100.0 B/sec";
        let readings = parse_speed_readings(text, DUCK_SPEED_SUFFIX).unwrap();
        assert_eq!(readings.len(), 4);
        assert!((readings[0] - 1.5).abs() < 1e-12);
        assert!((readings[1] - 0.5).abs() < 1e-12);
        assert!((readings[2] - 2.0).abs() < 1e-12);
        assert!((readings[3] - 0.0001).abs() < 1e-12);
    }

    #[test]
    fn test_mean_speed_reading() {
        let text = "Upload Temp_10M.txt (10.5 MB) 1.0 MB/sec\nUpload Temp_10M.txt 3.0 MB/sec\n";
        assert!((mean_speed_reading(text, DUCK_SPEED_SUFFIX).unwrap() - 2.0).abs() < 1e-12);
        assert!(mean_speed_reading("no speeds", DUCK_SPEED_SUFFIX).is_err());
    }

    #[test]
    fn test_suffixes_do_not_cross_match() {
        let text = "Uploaded 1abc at 4.2 MB/s, total 10.5 MB";
        assert!((first_speed_reading(text, GDRIVE_SPEED_SUFFIX).unwrap() - 4.2).abs() < 1e-12);
        assert!(parse_speed_readings(text, DUCK_SPEED_SUFFIX).unwrap().is_empty());
        assert!(parse_speed_readings("2.0 MB/sec", GDRIVE_SPEED_SUFFIX).unwrap().is_empty());
    }

    #[test]
    fn test_listings() {
        let listing = "Temp_1M.txt\nTemp_10M.txt\n";
        assert!(listing_contains(listing, "Temp_1M.txt"));
        assert!(!listing_contains(listing, "Temp_1"));
        // `ils` indents collection entries
        assert!(listing_contains("/iplant/home/user:\n  Temp_1M.txt\n", "Temp_1M.txt"));
        assert!(!listing_contains("/iplant/home/user:\n  Temp_1M.txt.bak\n", "Temp_1M.txt"));
    }

    #[test]
    fn test_gdrive_file_ids() {
        let listing = "\
Id                                  Name            Type   Size      Created
1AbCdEf                             Temp_10M.txt    bin    10.5 MB   2019-09-20 10:00:00
1XyZ                                Temp_1G.txt     bin    1.1 GB    2019-09-20 10:05:00
";
        assert_eq!(gdrive_file_ids(listing, "Temp_10M.txt"), vec!["1AbCdEf"]);
        assert!(gdrive_file_ids(listing, "Temp_100G.txt").is_empty());
        assert!(gdrive_file_ids(listing, "Name").is_empty());
    }

    #[test]
    fn test_gdrive_file_ids_exact_name_only() {
        let listing = "\
Id        Name                Type   Size      Created
1B        Temp_10M.txt        bin    10.5 MB   2019-09-20 10:00:00
1A        Temp_10M.txt.bak    bin    10.5 MB   2019-09-19 09:00:00
1C        old_Temp_10M.txt    bin    10.5 MB   2019-09-18 09:00:00
1D        Temp_10M.txt        bin    10.5 MB   2019-09-21 11:00:00
";
        assert_eq!(gdrive_file_ids(listing, "Temp_10M.txt"), vec!["1B", "1D"]);
        assert_eq!(gdrive_file_ids(listing, "Temp_10M.txt.bak"), vec!["1A"]);
    }

    #[test]
    fn test_gdrive_file_ids_names_with_spaces() {
        let listing = "1X    my Temp_1G.txt    bin    1.1 GB    2019-09-20 10:00:00\n1Y    Temp_1G.txt    bin    1.1 GB    2019-09-20 10:00:00\n";
        assert_eq!(gdrive_file_ids(listing, "my Temp_1G.txt"), vec!["1X"]);
        assert_eq!(gdrive_file_ids(listing, "Temp_1G.txt"), vec!["1Y"]);
    }
}
