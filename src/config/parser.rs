//! Configuration parsing from CLI arguments and environment variables

use crate::{
    cli::{Cli, RunArgs},
    config::env::EnvManager,
    error::Result,
    models::Config,
};

/// Builds the run configuration: defaults, then `.env`, then the
/// process environment, then command-line options
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and validate the complete configuration
    pub fn parse(&self) -> Result<Config> {
        let mut config = Config::default();

        // dotenv never overrides variables already present in the process
        // environment, so one merge covers both layers
        EnvManager::load_env_file(self.cli.debug)?;
        config.merge_from_env()?;

        self.apply_cli_overrides(&mut config);

        config.validate()?;

        Ok(config)
    }

    fn apply_cli_overrides(&self, config: &mut Config) {
        if let Some(args) = self.cli.run_args() {
            apply_run_args(args, config);
        }

        if self.cli.no_color {
            config.enable_color = false;
        }

        // CLI-only flags
        config.verbose = self.cli.verbose;
        config.debug = self.cli.debug;

        if config.debug {
            println!("Applied CLI overrides to configuration");
            println!(
                "Final config: tool={}, {} -> {}, trials={}, verify={}",
                config.tool, config.source, config.destination, config.trial_count, config.verify_integrity
            );
        }
    }
}

fn apply_run_args(args: &RunArgs, config: &mut Config) {
    if let Some(tool) = args.tool {
        config.tool = tool;
    }
    if let Some(source) = args.source {
        config.source = source;
    }
    if let Some(destination) = args.destination {
        config.destination = destination;
    }
    if let Some(verify) = args.verify_override() {
        config.verify_integrity = verify;
    }
    if !args.files.is_empty() {
        config.dummy_files = args.files.iter().map(|f| f.trim().to_string()).collect();
    }
    if let Some(trials) = args.trials {
        config.trial_count = trials;
    }
    if let Some(output) = &args.output {
        config.output_file = Some(output.clone());
    }
    if let Some(dir) = &args.local_dir {
        config.local_directory = Some(dir.clone());
    }
    if let Some(endpoint) = &args.source_endpoint {
        config.source_endpoint = Some(endpoint.clone());
    }
    if let Some(endpoint) = &args.destination_endpoint {
        config.destination_endpoint = Some(endpoint.clone());
    }
    if let Some(remote) = &args.rclone_remote {
        config.rclone_remote = Some(remote.clone());
    }
    if let Some(user) = &args.duck_username {
        config.duck_username = Some(user.clone());
    }
    if let Some(root) = &args.duck_root {
        config.duck_remote_root = root.clone();
    }
}

/// Convenience function to load complete configuration from CLI arguments
pub fn load_config(cli: Cli) -> Result<Config> {
    ConfigParser::new(cli).parse()
}

/// One line per setting, for `--verbose` and `--debug` runs
pub fn display_config_summary(config: &Config) -> String {
    let mut summary = Vec::new();

    summary.push(format!("Tool: {}", config.tool));
    summary.push(format!(
        "Route: {} -> {} ({})",
        config.source,
        config.destination,
        config.direction()
    ));
    summary.push(format!("Dummy Files: {}", config.dummy_files.join(", ")));
    summary.push(format!("Trials: {}", config.trial_count));
    summary.push(format!("Verify Integrity: {}", config.verify_integrity));
    summary.push(format!("Results File: {}", config.results_path().display()));
    if let Some(dir) = &config.local_directory {
        summary.push(format!("Local Directory: {}", dir.display()));
    }
    summary.push(format!("Color Output: {}", config.enable_color));
    summary.push(format!("Verbose: {}", config.verbose));
    summary.push(format!("Debug: {}", config.debug));

    summary.join("\n")
}
