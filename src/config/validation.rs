//! Advisory checks on a configuration that already passed `Config::validate`

use crate::{
    error::Result,
    models::Config,
    types::{Direction, Tool},
};
use colored::Colorize;

/// Configuration validator producing non-fatal warnings
pub struct ConfigValidator;

impl ConfigValidator {
    /// Run the hard validation, then collect warnings
    pub fn validate_comprehensive(config: &Config) -> Result<Vec<ValidationWarning>> {
        config.validate()?;

        let mut warnings = Vec::new();
        warnings.extend(Self::validate_trial_settings(config));
        warnings.extend(Self::validate_local_files(config)?);
        warnings.extend(Self::validate_integrity_setting(config));
        warnings.extend(Self::validate_output_path(config));

        Ok(warnings)
    }

    fn validate_trial_settings(config: &Config) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        if config.trial_count < 3 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Warning,
                format!(
                    "Trial count of {} gives a weak standard error estimate (recommended: >= 3)",
                    config.trial_count
                ),
            ));
        } else if config.trial_count > 50 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("{} trials per file will take a long time for large files", config.trial_count),
            ));
        }

        let total = config.dummy_files.len() as u32 * config.trial_count;
        if total > 100 {
            warnings.push(ValidationWarning::new(
                ValidationLevel::Info,
                format!("Configuration will perform {} transfers", total),
            ));
        }

        warnings
    }

    /// Uploads read the local dummy files, so they must exist up front
    fn validate_local_files(config: &Config) -> Result<Vec<ValidationWarning>> {
        if config.direction() != Direction::Upload {
            return Ok(Vec::new());
        }

        Ok(config
            .jobs()?
            .into_iter()
            .filter(|job| !job.local_path.exists())
            .map(|job| {
                ValidationWarning::new(
                    ValidationLevel::Warning,
                    format!("Local dummy file {} does not exist", job.local_path.display()),
                )
            })
            .collect())
    }

    fn validate_integrity_setting(config: &Config) -> Vec<ValidationWarning> {
        if !config.verify_integrity || Self::supports_integrity_check(config.tool) {
            return Vec::new();
        }

        vec![ValidationWarning::new(
            ValidationLevel::Info,
            format!("{} has no checksum option; integrity verification is ignored", config.tool),
        )]
    }

    fn validate_output_path(config: &Config) -> Vec<ValidationWarning> {
        let path = config.results_path();
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

        if is_csv {
            Vec::new()
        } else {
            vec![ValidationWarning::new(
                ValidationLevel::Info,
                format!("Results file {} does not end in .csv", path.display()),
            )]
        }
    }

    /// Tools that can be asked to verify checksums
    pub fn supports_integrity_check(tool: Tool) -> bool {
        matches!(tool, Tool::Globus | Tool::Irods)
    }
}

/// Validation warning levels
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    Info,
    Warning,
    Error,
}

impl ValidationLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        }
    }

    /// Color name for terminal display
    pub fn color(&self) -> &'static str {
        match self {
            Self::Info => "blue",
            Self::Warning => "yellow",
            Self::Error => "red",
        }
    }
}

/// Configuration validation warning
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub level: ValidationLevel,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(level: ValidationLevel, message: String) -> Self {
        Self { level, message }
    }

    /// Format warning for display
    pub fn format(&self, use_color: bool) -> String {
        let tag = format!("[{}]", self.level.as_str());
        if use_color {
            format!("{} {}", tag.color(self.level.color()).bold(), self.message)
        } else {
            format!("{} {}", tag, self.message)
        }
    }
}

/// Convenience function for comprehensive configuration validation
pub fn validate_config(config: &Config) -> Result<Vec<ValidationWarning>> {
    ConfigValidator::validate_comprehensive(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Site;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn rclone_upload(dir: &TempDir) -> Config {
        Config {
            tool: Tool::Rclone,
            source: Site::PersonalComputer,
            destination: Site::GoogleDrive,
            rclone_remote: Some("MyGoogleDrive".to_string()),
            dummy_files: vec!["Temp_1M.txt".to_string()],
            local_directory: Some(dir.path().to_path_buf()),
            ..Config::default()
        }
    }

    fn messages(warnings: &[ValidationWarning]) -> Vec<&str> {
        warnings.iter().map(|w| w.message.as_str()).collect()
    }

    #[test]
    fn test_clean_config_has_no_warnings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Temp_1M.txt"), b"x").unwrap();

        let warnings = validate_config(&rclone_upload(&dir)).unwrap();
        assert!(warnings.is_empty(), "{:?}", messages(&warnings));
    }

    #[test]
    fn test_missing_local_file_warns_on_upload() {
        let dir = TempDir::new().unwrap();
        let warnings = validate_config(&rclone_upload(&dir)).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].level, ValidationLevel::Warning);
        assert!(warnings[0].message.contains("Temp_1M.txt"));
    }

    #[test]
    fn test_missing_local_file_ignored_on_download() {
        let dir = TempDir::new().unwrap();
        let mut config = rclone_upload(&dir);
        config.source = Site::GoogleDrive;
        config.destination = Site::PersonalComputer;

        assert!(validate_config(&config).unwrap().is_empty());
    }

    #[test]
    fn test_integrity_flag_on_tool_without_checksums() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Temp_1M.txt"), b"x").unwrap();
        let mut config = rclone_upload(&dir);
        config.verify_integrity = true;

        let warnings = validate_config(&config).unwrap();
        assert!(messages(&warnings).iter().any(|m| m.contains("no checksum option")));
        assert!(ConfigValidator::supports_integrity_check(Tool::Irods));
        assert!(!ConfigValidator::supports_integrity_check(Tool::Cyberduck));
    }

    #[test]
    fn test_low_trial_count_and_output_extension() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Temp_1M.txt"), b"x").unwrap();
        let mut config = rclone_upload(&dir);
        config.trial_count = 1;
        config.output_file = Some(PathBuf::from("results.txt"));

        let warnings = validate_config(&config).unwrap();
        let messages = messages(&warnings);
        assert!(messages.iter().any(|m| m.contains("weak standard error")));
        assert!(messages.iter().any(|m| m.contains("does not end in .csv")));
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let mut config = rclone_upload(&dir);
        config.rclone_remote = None;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_warning_format() {
        let warning = ValidationWarning::new(ValidationLevel::Info, "hello".to_string());
        assert_eq!(warning.format(false), "[INFO] hello");
        assert!(warning.format(true).contains("hello"));
    }
}
