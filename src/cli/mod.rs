//! Command-line interface

use crate::types::{Site, Tool};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Transfer benchmark - measure file transfer throughput of storage CLIs
#[derive(Parser, Debug, Clone)]
#[command(name = "tbench")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output (echo commands and their output)
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the benchmark and write one results row per trial
    Run(RunArgs),

    /// Compute per-size mean and standard error of a results file
    Aggregate(AggregateArgs),

    /// Write an example .env file
    InitEnv {
        /// Destination of the example file
        #[arg(default_value = ".env.example")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Describe the supported environment variables
    EnvHelp,
}

/// Options of `tbench run`; unset options fall back to the environment
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Transfer tool: globus, irods, rclone, gdrive, cyberduck
    #[arg(long)]
    pub tool: Option<Tool>,

    /// Source site: personal-computer, hpc, aws-s3, google-drive, cyverse
    #[arg(long)]
    pub source: Option<Site>,

    /// Destination site (same choices as --source)
    #[arg(long)]
    pub destination: Option<Site>,

    /// Verify file integrity (checksums) where the tool supports it
    #[arg(long)]
    pub verify: bool,

    /// Skip integrity verification
    #[arg(long)]
    pub no_verify: bool,

    /// Dummy file to transfer; its name must contain a size label such as 10M (repeatable)
    #[arg(long = "file", action = ArgAction::Append)]
    pub files: Vec<String>,

    /// Trials per dummy file
    #[arg(short = 'n', long, value_parser = parse_trial_count)]
    pub trials: Option<u32>,

    /// Results CSV path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory holding the local dummy files
    #[arg(long)]
    pub local_dir: Option<PathBuf>,

    /// Globus source collection prefix (endpoint-id:/path/)
    #[arg(long)]
    pub source_endpoint: Option<String>,

    /// Globus destination collection prefix (endpoint-id:/path/)
    #[arg(long)]
    pub destination_endpoint: Option<String>,

    /// rclone remote name
    #[arg(long)]
    pub rclone_remote: Option<String>,

    /// Cyberduck login name
    #[arg(long)]
    pub duck_username: Option<String>,

    /// Cyberduck remote folder, e.g. "googledrive:My Drive"
    #[arg(long)]
    pub duck_root: Option<String>,
}

impl RunArgs {
    /// `Some` when the integrity setting was given on the command line
    pub fn verify_override(&self) -> Option<bool> {
        match (self.verify, self.no_verify) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct AggregateArgs {
    /// Results CSV produced by `tbench run`
    pub input: PathBuf,

    /// Value column to aggregate (default: first column after FileSize)
    #[arg(long)]
    pub column: Option<String>,

    /// Treat values as elapsed seconds and convert them with the nominal size table
    #[arg(long)]
    pub elapsed_seconds: bool,

    /// Output path (default: <input>_means.csv)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Also print the rows as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Run(args) = &self.command {
            if args.verify && args.no_verify {
                return Err("Cannot specify both --verify and --no-verify".to_string());
            }
            if args.files.iter().any(|f| f.trim().is_empty()) {
                return Err("--file cannot be empty".to_string());
            }
        }
        Ok(())
    }

    pub fn use_colors(&self) -> bool {
        !self.no_color && supports_color()
    }

    pub fn run_args(&self) -> Option<&RunArgs> {
        match &self.command {
            Command::Run(args) => Some(args),
            _ => None,
        }
    }
}

fn parse_trial_count(s: &str) -> Result<u32, String> {
    if s.starts_with('+') {
        return Err(format!("Invalid trial count: {}", s));
    }

    s.parse::<u32>()
        .map_err(|_| format!("Invalid trial count: {}", s))
        .and_then(|n| {
            if n == 0 {
                Err("Trial count must be greater than 0".to_string())
            } else if n > 100 {
                Err("Trial count cannot exceed 100".to_string())
            } else {
                Ok(n)
            }
        })
}

/// Whether the terminal is likely to render ANSI colors
fn supports_color() -> bool {
    if let Ok(term) = std::env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    #[cfg(target_os = "windows")]
    {
        if std::env::var("ANSICON").is_ok() || std::env::var("ConEmuANSI").is_ok() {
            return true;
        }
    }

    cfg!(unix)
}
