//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use crate::models::{config::split_list, SizeLabel};
use crate::types::{Site, Tool};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load `.env` from the current directory if present
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                println!("Loaded configuration from .env file");
            }
        } else if debug {
            println!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Example .env content
    pub fn create_example_env_content() -> String {
        r#"# Transfer Benchmark Configuration
#
# Values here are read by `tbench run` and can be overridden by
# command-line options.

# Transfer tool: globus, irods, rclone, gdrive, cyberduck
# TRANSFER_TOOL=globus

# Sites: personal-computer, hpc, aws-s3, google-drive, cyverse
# SOURCE_SITE=hpc
# DESTINATION_SITE=aws-s3

# Verify checksums where the tool supports it (true/false)
# VERIFY_INTEGRITY=false

# Dummy files (comma-separated). Each name must contain its size label,
# an integer followed by B, K, M or G.
# DUMMY_FILES=Temp_1M.txt,Temp_10M.txt,Temp_100M.txt,Temp_1G.txt

# Trials per dummy file (1-100)
# TRIAL_COUNT=5

# Results CSV (default: <Tool>_<Source>_to_<Destination>[_NoChecksum].csv)
# OUTPUT_FILE=results.csv

# Directory holding the local dummy files
# LOCAL_DIRECTORY=/extra/user/dummy_files

# Globus collection prefixes (endpoint-id:/path/)
# SOURCE_ENDPOINT=
# DESTINATION_ENDPOINT=

# rclone remote name
# RCLONE_REMOTE=MyGoogleDrive

# Cyberduck login and remote folder
# DUCK_USERNAME=user@example.edu
# DUCK_REMOTE_ROOT=googledrive:My Drive

# Enable colored output (true/false)
# ENABLE_COLOR=true

# Example: iRODS upload from HPC to CyVerse with checksums
# TRANSFER_TOOL=irods
# SOURCE_SITE=hpc
# DESTINATION_SITE=cyverse
# VERIFY_INTEGRITY=true
# DUMMY_FILES=Temp_1M_irods.txt,Temp_10M_irods.txt
"#
        .to_string()
    }

    /// Write the example .env file; refuses to replace a file unless `force`
    pub fn save_example_env_file(path: &Path, force: bool) -> Result<()> {
        if path.exists() && !force {
            return Err(AppError::config(format!(
                "{} already exists (use --force to overwrite)",
                path.display()
            )));
        }

        std::fs::write(path, Self::create_example_env_content())
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Check one variable's value without applying it
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "TRANSFER_TOOL" => {
                value.parse::<Tool>()?;
            }
            "SOURCE_SITE" | "DESTINATION_SITE" => {
                value.parse::<Site>()?;
            }
            "VERIFY_INTEGRITY" | "ENABLE_COLOR" => {
                value
                    .trim()
                    .parse::<bool>()
                    .map_err(|e| AppError::config(format!("Invalid {} value '{}': {}", key, value, e)))?;
            }
            "DUMMY_FILES" => {
                let files = split_list(value);
                if files.is_empty() {
                    return Err(AppError::config("DUMMY_FILES cannot be empty"));
                }
                for file in files {
                    let name = Path::new(&file)
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(file.as_str());
                    SizeLabel::from_filename(name)?;
                }
            }
            "TRIAL_COUNT" => {
                let count: u32 = value
                    .trim()
                    .parse()
                    .map_err(|e| AppError::config(format!("Invalid TRIAL_COUNT value '{}': {}", value, e)))?;
                if count == 0 || count > 100 {
                    return Err(AppError::config(format!(
                        "TRIAL_COUNT must be between 1 and 100, got: {}",
                        count
                    )));
                }
            }
            "SOURCE_ENDPOINT" | "DESTINATION_ENDPOINT" => {
                if !value.trim().is_empty() && !value.contains(':') {
                    return Err(AppError::config(format!(
                        "{} must look like endpoint-id:/path/, got '{}'",
                        key, value
                    )));
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// `(name, description, example)` for every supported variable
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("TRANSFER_TOOL", "Transfer tool to benchmark", "globus"),
            ("SOURCE_SITE", "Site the files are copied from", "hpc"),
            ("DESTINATION_SITE", "Site the files are copied to", "aws-s3"),
            ("VERIFY_INTEGRITY", "Verify checksums where supported", "false"),
            ("DUMMY_FILES", "Comma-separated dummy files with size labels", "Temp_1M.txt,Temp_1G.txt"),
            ("TRIAL_COUNT", "Trials per dummy file (1-100)", "5"),
            ("OUTPUT_FILE", "Results CSV path", "Globus_HPC_to_AWS.csv"),
            ("LOCAL_DIRECTORY", "Directory of the local dummy files", "/extra/user/dummy_files"),
            ("SOURCE_ENDPOINT", "Globus source collection prefix", "ab12-cd34:/~/dummy/"),
            ("DESTINATION_ENDPOINT", "Globus destination collection prefix", "ef56-7890:/bucket/"),
            ("RCLONE_REMOTE", "rclone remote name", "MyGoogleDrive"),
            ("DUCK_USERNAME", "Cyberduck login", "user@example.edu"),
            ("DUCK_REMOTE_ROOT", "Cyberduck remote folder", "googledrive:My Drive"),
            ("ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<22} {}\n", var, description));
            help.push_str(&format!("  {:<22} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Problems with the variables currently set in the environment
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(name, _, _)| {
                let value = std::env::var(name).ok()?;
                Self::validate_env_var(name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
