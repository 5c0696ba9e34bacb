//! Additional comprehensive tests for configuration parsing and validation

use super::parser::tests::clean_env;
use super::{ConfigParser, EnvManager};
use crate::{
    cli::Cli,
    models::{config::split_list, Config},
    types::{Site, Tool},
};
use clap::Parser;
use proptest::prelude::*;
use std::env;

fn irods_upload() -> Config {
    Config {
        tool: Tool::Irods,
        source: Site::Hpc,
        destination: Site::Cyverse,
        dummy_files: vec!["Temp_1M_irods.txt".to_string()],
        ..Config::default()
    }
}

/// Test edge cases in configuration parsing
mod config_edge_cases {
    use super::*;

    #[test]
    fn test_many_dummy_files() {
        let mut config = irods_upload();
        config.dummy_files = (1..=500).map(|i| format!("Temp_{}M.txt", i)).collect();

        assert!(config.validate().is_ok());
        let jobs = config.jobs().unwrap();
        assert_eq!(jobs.len(), 500);
        assert_eq!(jobs[499].size_label.as_str(), "500M");
    }

    #[test]
    fn test_dummy_file_paths_keep_their_directory() {
        let mut config = irods_upload();
        config.dummy_files = vec!["/extra/bench/Temp_1G.txt".to_string()];
        config.local_directory = Some("/ignored".into());

        let jobs = config.jobs().unwrap();
        assert_eq!(jobs[0].file_name, "Temp_1G.txt");
        assert_eq!(jobs[0].local_path, std::path::PathBuf::from("/extra/bench/Temp_1G.txt"));
    }

    #[test]
    fn test_every_tool_rejects_third_party_except_globus() {
        for tool in Tool::ALL {
            let config = Config {
                tool,
                source: Site::AwsS3,
                destination: Site::GoogleDrive,
                dummy_files: vec!["Temp_1M.txt".to_string()],
                source_endpoint: Some("a:/x/".to_string()),
                destination_endpoint: Some("b:/y/".to_string()),
                rclone_remote: Some("r".to_string()),
                duck_username: Some("u".to_string()),
                ..Config::default()
            };
            assert_eq!(config.validate().is_ok(), tool == Tool::Globus, "{}", tool);
        }
    }
}

/// Test environment variable parsing edge cases
mod env_parsing_tests {
    use super::*;

    #[test]
    fn test_env_var_boundary_values() {
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", "1").is_ok());
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", "100").is_ok());
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", " 7 ").is_ok());
        assert!(EnvManager::validate_env_var("TRIAL_COUNT", "-1").is_err());
    }

    #[test]
    fn test_env_var_boolean_validation() {
        // Only lowercase true/false are accepted
        assert!(EnvManager::validate_env_var("VERIFY_INTEGRITY", "true").is_ok());
        assert!(EnvManager::validate_env_var("VERIFY_INTEGRITY", "false").is_ok());
        assert!(EnvManager::validate_env_var("VERIFY_INTEGRITY", "TRUE").is_err());
        assert!(EnvManager::validate_env_var("VERIFY_INTEGRITY", "yes").is_err());
        assert!(EnvManager::validate_env_var("VERIFY_INTEGRITY", "1").is_err());
    }

    #[test]
    fn test_error_messages_name_the_variable() {
        let err = EnvManager::validate_env_var("TRIAL_COUNT", "0").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("TRIAL_COUNT"));
        assert!(msg.contains("between 1 and 100"));

        let err = EnvManager::validate_env_var("DUMMY_FILES", "Temp_1M.txt,notes.txt").unwrap_err();
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_validate_current_env_reports_bad_values() {
        let _guard = clean_env();
        env::set_var("TRANSFER_TOOL", "scp");
        env::set_var("TRIAL_COUNT", "4");

        let problems = EnvManager::validate_current_env();
        assert_eq!(problems.len(), 1);
        assert!(problems[0].contains("scp"));

        env::remove_var("TRANSFER_TOOL");
        env::remove_var("TRIAL_COUNT");
    }
}

/// Test configuration merging priorities
mod config_priority_tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let _guard = clean_env();

        let env_backup = std::path::Path::new(".env").exists();
        if env_backup {
            let _ = std::fs::rename(".env", ".env.backup_priority");
        }

        std::fs::write(
            ".env",
            "TRANSFER_TOOL=irods\nSOURCE_SITE=hpc\nDESTINATION_SITE=cyverse\nDUMMY_FILES=Temp_1M.txt\nTRIAL_COUNT=15\nVERIFY_INTEGRITY=true\n",
        )
        .unwrap();

        // Environment beats .env
        env::set_var("TRIAL_COUNT", "25");
        env::set_var("VERIFY_INTEGRITY", "false");

        let cli = Cli::parse_from(["tbench", "run", "--trials", "35"]);
        let result = ConfigParser::new(cli).parse();

        let _ = std::fs::remove_file(".env");
        if env_backup {
            let _ = std::fs::rename(".env.backup_priority", ".env");
        }
        for (name, _, _) in EnvManager::get_supported_env_vars() {
            env::remove_var(name);
        }

        let config = result.unwrap();
        assert_eq!(config.tool, Tool::Irods);
        assert_eq!(config.trial_count, 35);
        assert!(!config.verify_integrity);
    }
}

/// Test concurrent configuration operations
mod concurrency_tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_concurrent_validation() {
        let handles: Vec<_> = (1..=10u32)
            .map(|i| {
                thread::spawn(move || {
                    let mut config = irods_upload();
                    config.trial_count = i * 10;
                    config.dummy_files = vec![format!("Temp_{}G.txt", i)];
                    assert!(config.validate().is_ok());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

proptest! {
    #[test]
    fn prop_trial_count_range(count in 0u32..200) {
        let mut config = irods_upload();
        config.trial_count = count;
        prop_assert_eq!(config.validate().is_ok(), (1..=100).contains(&count));
    }

    #[test]
    fn prop_split_list_drops_blanks(items in prop::collection::vec("[A-Za-z0-9_.]{0,8}", 0..10)) {
        let joined = items.join(" , ");
        let split = split_list(&joined);
        let expected: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();
        prop_assert_eq!(split, expected);
    }

    #[test]
    fn prop_labelled_names_are_accepted(prefix in "[A-Za-z_]{0,6}", size in 1u32..10_000, unit in "[BKMG]") {
        let name = format!("{}{}{}.txt", prefix, size, unit);
        prop_assert!(EnvManager::validate_env_var("DUMMY_FILES", &name).is_ok());
    }
}
