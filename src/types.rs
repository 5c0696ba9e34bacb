//! Type definitions and aliases

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// Re-export commonly used types
pub use crate::error::{AppError, Result};

/// Transfer CLIs that can be benchmarked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Globus CLI (asynchronous: returns a task id)
    Globus,
    /// iRODS icommands (`iput` / `iget`)
    Irods,
    /// rclone
    Rclone,
    /// gdrive
    Gdrive,
    /// Cyberduck CLI (`duck`)
    Cyberduck,
}

impl Tool {
    pub const ALL: [Tool; 5] = [Tool::Globus, Tool::Irods, Tool::Rclone, Tool::Gdrive, Tool::Cyberduck];

    /// Lowercase identifier used on the command line and in env files
    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Globus => "globus",
            Tool::Irods => "irods",
            Tool::Rclone => "rclone",
            Tool::Gdrive => "gdrive",
            Tool::Cyberduck => "cyberduck",
        }
    }

    /// Name used in result file names
    pub fn display_name(&self) -> &'static str {
        match self {
            Tool::Globus => "Globus",
            Tool::Irods => "Irods",
            Tool::Rclone => "Rclone",
            Tool::Gdrive => "Gdrive",
            Tool::Cyberduck => "Cyberduck",
        }
    }

    /// Remote site this tool talks to, `None` when any endpoint pair is allowed
    pub fn remote_site(&self) -> Option<Site> {
        match self {
            Tool::Globus => None,
            Tool::Irods => Some(Site::Cyverse),
            Tool::Rclone | Tool::Gdrive | Tool::Cyberduck => Some(Site::GoogleDrive),
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "globus" => Ok(Tool::Globus),
            "irods" => Ok(Tool::Irods),
            "rclone" => Ok(Tool::Rclone),
            "gdrive" => Ok(Tool::Gdrive),
            "cyberduck" | "duck" => Ok(Tool::Cyberduck),
            other => Err(AppError::config(format!(
                "Unknown transfer tool '{}' (expected one of: globus, irods, rclone, gdrive, cyberduck)",
                other
            ))),
        }
    }
}

/// Locations a transfer can start from or end at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Site {
    /// The workstation running the benchmark
    PersonalComputer,
    /// A cluster transfer node running the benchmark
    Hpc,
    /// Amazon S3 storage
    AwsS3,
    /// Google Drive
    GoogleDrive,
    /// CyVerse data store
    Cyverse,
}

impl Site {
    /// Whether files on this site live on the machine running the benchmark
    pub fn is_local(&self) -> bool {
        matches!(self, Site::PersonalComputer | Site::Hpc)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Site::PersonalComputer => "personal-computer",
            Site::Hpc => "hpc",
            Site::AwsS3 => "aws-s3",
            Site::GoogleDrive => "google-drive",
            Site::Cyverse => "cyverse",
        }
    }

    /// Name used in result file names
    pub fn display_name(&self) -> &'static str {
        match self {
            Site::PersonalComputer => "PersonalComputer",
            Site::Hpc => "HPC",
            Site::AwsS3 => "AWS",
            Site::GoogleDrive => "GoogleDrive",
            Site::Cyverse => "Cyverse",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Site {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "personalcomputer" | "pc" | "local" => Ok(Site::PersonalComputer),
            "hpc" => Ok(Site::Hpc),
            "awss3" | "aws" | "s3" => Ok(Site::AwsS3),
            "googledrive" | "gdrive" => Ok(Site::GoogleDrive),
            "cyverse" => Ok(Site::Cyverse),
            _ => Err(AppError::config(format!(
                "Unknown site '{}' (expected one of: personal-computer, hpc, aws-s3, google-drive, cyverse)",
                s.trim()
            ))),
        }
    }
}

/// Transfer direction relative to the machine running the benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Upload,
    Download,
    /// Both ends are remote (third-party Globus transfer)
    ThirdParty,
}

impl Direction {
    /// Derive the direction from a source/destination pair
    pub fn between(source: Site, destination: Site) -> Self {
        match (source.is_local(), destination.is_local()) {
            (true, false) => Direction::Upload,
            (false, true) => Direction::Download,
            _ => Direction::ThirdParty,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Upload => f.write_str("upload"),
            Direction::Download => f.write_str("download"),
            Direction::ThirdParty => f.write_str("third-party"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_parsing() {
        assert_eq!("globus".parse::<Tool>().unwrap(), Tool::Globus);
        assert_eq!(" iRODS ".parse::<Tool>().unwrap(), Tool::Irods);
        assert_eq!("duck".parse::<Tool>().unwrap(), Tool::Cyberduck);
        assert!("scp".parse::<Tool>().is_err());
    }

    #[test]
    fn test_site_parsing_is_lenient_on_separators() {
        assert_eq!("Personal Computer".parse::<Site>().unwrap(), Site::PersonalComputer);
        assert_eq!("personal-computer".parse::<Site>().unwrap(), Site::PersonalComputer);
        assert_eq!("AWS".parse::<Site>().unwrap(), Site::AwsS3);
        assert_eq!("google_drive".parse::<Site>().unwrap(), Site::GoogleDrive);
        assert!("mars".parse::<Site>().is_err());
    }

    #[test]
    fn test_direction_between_sites() {
        assert_eq!(Direction::between(Site::Hpc, Site::Cyverse), Direction::Upload);
        assert_eq!(Direction::between(Site::GoogleDrive, Site::PersonalComputer), Direction::Download);
        assert_eq!(Direction::between(Site::AwsS3, Site::GoogleDrive), Direction::ThirdParty);
        assert_eq!(Direction::between(Site::Hpc, Site::PersonalComputer), Direction::ThirdParty);
    }

    #[test]
    fn test_tool_remote_sites() {
        assert_eq!(Tool::Irods.remote_site(), Some(Site::Cyverse));
        assert_eq!(Tool::Rclone.remote_site(), Some(Site::GoogleDrive));
        assert_eq!(Tool::Globus.remote_site(), None);
    }

    #[test]
    fn test_site_serde_names() {
        let json = serde_json::to_string(&Site::AwsS3).unwrap();
        assert_eq!(json, "\"aws-s3\"");
        let tool: Tool = serde_json::from_str("\"cyberduck\"").unwrap();
        assert_eq!(tool, Tool::Cyberduck);
    }
}
