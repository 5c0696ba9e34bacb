//! Configuration data model and validation

use crate::models::trial::TransferJob;
use crate::types::{AppError, Direction, Result, Site, Tool};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
///
/// Built once by the config parser and passed by reference everywhere after;
/// nothing mutates it once a run has started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Transfer CLI under test
    #[serde(default = "default_tool")]
    pub tool: Tool,

    /// Where the dummy files start
    #[serde(default = "default_source")]
    pub source: Site,

    /// Where the dummy files end up
    #[serde(default = "default_destination")]
    pub destination: Site,

    /// Ask the tool to verify checksums after transfer
    #[serde(default = "default_verify_integrity")]
    pub verify_integrity: bool,

    /// Dummy file names or paths; each must embed a size label
    #[serde(default)]
    pub dummy_files: Vec<String>,

    /// Number of repeated trials per dummy file
    #[serde(default = "default_trial_count")]
    pub trial_count: u32,

    /// Results CSV path; derived from tool and sites when absent
    #[serde(default)]
    pub output_file: Option<PathBuf>,

    /// Directory holding local copies of bare dummy file names
    #[serde(default)]
    pub local_directory: Option<PathBuf>,

    /// Globus `endpoint-id:path/` prefix of the source
    #[serde(default)]
    pub source_endpoint: Option<String>,

    /// Globus `endpoint-id:path/` prefix of the destination
    #[serde(default)]
    pub destination_endpoint: Option<String>,

    /// rclone remote name (without trailing colon)
    #[serde(default)]
    pub rclone_remote: Option<String>,

    /// Login passed to `duck --username`
    #[serde(default)]
    pub duck_username: Option<String>,

    /// Remote folder used by `duck`
    #[serde(default = "default_duck_remote_root")]
    pub duck_remote_root: String,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tool: default_tool(),
            source: default_source(),
            destination: default_destination(),
            verify_integrity: default_verify_integrity(),
            dummy_files: Vec::new(),
            trial_count: default_trial_count(),
            output_file: None,
            local_directory: None,
            source_endpoint: None,
            destination_endpoint: None,
            rclone_remote: None,
            duck_username: None,
            duck_remote_root: default_duck_remote_root(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Transfer direction implied by the source/destination pair
    pub fn direction(&self) -> Direction {
        Direction::between(self.source, self.destination)
    }

    /// Resolve the configured dummy files into transfer jobs
    pub fn jobs(&self) -> Result<Vec<TransferJob>> {
        self.dummy_files
            .iter()
            .map(|entry| TransferJob::from_entry(entry, self.local_directory.as_deref()))
            .collect()
    }

    /// Path of the results CSV
    pub fn results_path(&self) -> PathBuf {
        if let Some(path) = &self.output_file {
            return path.clone();
        }

        let mut name = format!(
            "{}_{}_to_{}",
            self.tool.display_name(),
            self.source.display_name(),
            self.destination.display_name()
        );
        if !self.verify_integrity {
            name.push_str("_NoChecksum");
        }
        name.push_str(".csv");
        PathBuf::from(name)
    }

    /// Validate the configuration and return the first error found
    pub fn validate(&self) -> Result<()> {
        if self.trial_count == 0 {
            return Err(AppError::config("Trial count must be greater than 0"));
        }

        if self.trial_count > 100 {
            return Err(AppError::config("Trial count cannot exceed 100"));
        }

        if self.source == self.destination {
            return Err(AppError::config(format!(
                "Source and destination must differ (both are '{}')",
                self.source
            )));
        }

        if self.dummy_files.is_empty() {
            return Err(AppError::config("At least one dummy file is required"));
        }

        for entry in &self.dummy_files {
            if entry.trim().is_empty() {
                return Err(AppError::config("Dummy file entry cannot be empty"));
            }
            TransferJob::from_entry(entry, self.local_directory.as_deref())?;
        }

        self.validate_tool_sites()?;
        self.validate_tool_options()?;

        Ok(())
    }

    fn validate_tool_sites(&self) -> Result<()> {
        let Some(remote) = self.tool.remote_site() else {
            return Ok(());
        };

        let pair_ok = match self.direction() {
            Direction::Upload => self.destination == remote,
            Direction::Download => self.source == remote,
            Direction::ThirdParty => false,
        };

        if !pair_ok {
            return Err(AppError::config(format!(
                "{} transfers between a local machine and {}; got {} -> {}",
                self.tool, remote, self.source, self.destination
            )));
        }

        Ok(())
    }

    fn validate_tool_options(&self) -> Result<()> {
        match self.tool {
            Tool::Globus => {
                require_option("SOURCE_ENDPOINT", self.source_endpoint.as_deref())?;
                require_option("DESTINATION_ENDPOINT", self.destination_endpoint.as_deref())?;
            }
            Tool::Rclone => {
                require_option("RCLONE_REMOTE", self.rclone_remote.as_deref())?;
            }
            Tool::Cyberduck => {
                require_option("DUCK_USERNAME", self.duck_username.as_deref())?;
                if self.duck_remote_root.trim().is_empty() {
                    return Err(AppError::config("DUCK_REMOTE_ROOT cannot be empty"));
                }
            }
            Tool::Irods | Tool::Gdrive => {}
        }
        Ok(())
    }

    /// Merge environment variables into this configuration
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(tool) = std::env::var("TRANSFER_TOOL") {
            self.tool = tool.parse()?;
        }

        if let Ok(source) = std::env::var("SOURCE_SITE") {
            self.source = source.parse()?;
        }

        if let Ok(destination) = std::env::var("DESTINATION_SITE") {
            self.destination = destination.parse()?;
        }

        if let Ok(verify) = std::env::var("VERIFY_INTEGRITY") {
            self.verify_integrity = verify.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid VERIFY_INTEGRITY value '{}': {}", verify, e)))?;
        }

        if let Ok(files) = std::env::var("DUMMY_FILES") {
            self.dummy_files = split_list(&files);
        }

        if let Ok(trials) = std::env::var("TRIAL_COUNT") {
            self.trial_count = trials.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid TRIAL_COUNT value '{}': {}", trials, e)))?;
        }

        if let Ok(output) = std::env::var("OUTPUT_FILE") {
            self.output_file = non_empty(&output).map(PathBuf::from);
        }

        if let Ok(dir) = std::env::var("LOCAL_DIRECTORY") {
            self.local_directory = non_empty(&dir).map(PathBuf::from);
        }

        if let Ok(endpoint) = std::env::var("SOURCE_ENDPOINT") {
            self.source_endpoint = non_empty(&endpoint);
        }

        if let Ok(endpoint) = std::env::var("DESTINATION_ENDPOINT") {
            self.destination_endpoint = non_empty(&endpoint);
        }

        if let Ok(remote) = std::env::var("RCLONE_REMOTE") {
            self.rclone_remote = non_empty(&remote);
        }

        if let Ok(user) = std::env::var("DUCK_USERNAME") {
            self.duck_username = non_empty(&user);
        }

        if let Ok(root) = std::env::var("DUCK_REMOTE_ROOT") {
            self.duck_remote_root = root.trim().to_string();
        }

        if let Ok(enable_color) = std::env::var("ENABLE_COLOR") {
            self.enable_color = enable_color.trim().parse()
                .map_err(|e| AppError::config(format!("Invalid ENABLE_COLOR value '{}': {}", enable_color, e)))?;
        }

        Ok(())
    }
}

fn require_option(name: &str, value: Option<&str>) -> Result<()> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(AppError::config(format!("{} is required for this transfer tool", name))),
    }
}

/// Split a comma-separated list, dropping empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn default_tool() -> Tool {
    Tool::Globus
}

fn default_source() -> Site {
    Site::Hpc
}

fn default_destination() -> Site {
    Site::AwsS3
}

fn default_verify_integrity() -> bool {
    crate::defaults::DEFAULT_VERIFY_INTEGRITY
}

fn default_trial_count() -> u32 {
    crate::defaults::DEFAULT_TRIAL_COUNT
}

fn default_duck_remote_root() -> String {
    crate::defaults::DEFAULT_DUCK_REMOTE_ROOT.to_string()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
