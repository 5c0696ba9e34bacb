//! Main application orchestration and execution

use crate::{
    backends::{create_backend, TransferBackend},
    cli::{AggregateArgs, Cli, Command},
    config::{display_config_summary, load_config, validate_config, ConfigValidator, EnvManager},
    error::Result,
    executor::{CommandRunner, SystemCommandRunner},
    logging::{ErrorEventLogger, LoggerFactory, TrialLogger},
    models::{Config, TrialRecord},
    output::{OutputFormatter, OutputFormatterFactory, RunSummary},
    results::ResultWriter,
    stats::{default_output_path, write_aggregate, AggregateRow, Aggregator, ValueKind},
};
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

/// Runs every trial of a configuration and records one row per trial
pub struct BenchmarkRunner {
    config: Config,
    backend: Box<dyn TransferBackend>,
    formatter: Box<dyn OutputFormatter>,
    trial_logger: TrialLogger,
    error_logger: ErrorEventLogger,
}

impl BenchmarkRunner {
    pub async fn new(config: Config, runner: Arc<dyn CommandRunner>) -> Result<Self> {
        let backend = create_backend(&config, runner)?;
        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);
        let factory = LoggerFactory::new(config.clone());

        Ok(Self {
            trial_logger: factory.create_trial_logger().await,
            error_logger: factory.create_error_logger().await,
            config,
            backend,
            formatter,
        })
    }

    /// Run all trials in order: each dummy file, `trial_count` times
    ///
    /// The first failing step aborts the run. Rows already appended stay in
    /// the results file.
    pub async fn run(&self) -> Result<RunSummary> {
        let jobs = self.config.jobs()?;
        let columns = self.backend.metric_columns();
        let started_at = Utc::now();
        let clock = Instant::now();

        self.trial_logger.log_run_start(&self.config, started_at).await;
        if self.config.verify_integrity && !ConfigValidator::supports_integrity_check(self.backend.tool()) {
            self.trial_logger.log_integrity_ignored(self.backend.tool().as_str()).await;
        }

        let writer = ResultWriter::create(self.config.results_path(), columns)?;
        let total = self.config.trial_count;
        let mut records = Vec::with_capacity(jobs.len() * total as usize);

        for job in &jobs {
            for trial in 1..=total {
                let correlation_id = self.trial_logger.start_trial(job, trial, total).await;

                let outcome = async {
                    self.backend.cleanup_destination(job).await?;
                    self.trial_logger.log_cleanup(job, &correlation_id).await;

                    let measurement = self.backend.transfer(job).await?;
                    let record = TrialRecord::new(job.size_label.clone(), measurement.values.clone());
                    writer.append(&record)?;
                    Ok::<_, crate::error::AppError>((record, measurement))
                }
                .await;

                let (record, measurement) = match outcome {
                    Ok(done) => done,
                    Err(e) => {
                        self.error_logger
                            .log_trial_failure(&e, job, trial, &correlation_id)
                            .await;
                        return Err(e);
                    }
                };

                self.trial_logger
                    .log_trial_complete(job, columns, &measurement, &correlation_id)
                    .await;
                println!("{}", self.formatter.format_trial_result(job, trial, total, columns, &record)?);

                records.push((record, measurement.elapsed_seconds));
            }
        }

        self.trial_logger.log_run_complete(records.len(), started_at).await;

        Ok(RunSummary::from_records(
            self.backend.tool(),
            self.config.direction(),
            writer.path().to_path_buf(),
            columns,
            &records,
            clock.elapsed().as_secs_f64(),
        ))
    }
}

/// Result of the aggregate command
#[derive(Debug, Clone)]
pub struct AggregateReport {
    pub output_path: PathBuf,
    pub rows: Vec<AggregateRow>,
}

/// Aggregate a results file into `<input>_means.csv` (or `--output`)
pub fn run_aggregate(args: &AggregateArgs) -> Result<AggregateReport> {
    let kind = if args.elapsed_seconds {
        ValueKind::ElapsedSeconds
    } else {
        ValueKind::Speed
    };

    let rows = Aggregator::with_kind(kind).aggregate_file(&args.input, args.column.as_deref())?;
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.input));
    write_aggregate(&output_path, &rows)?;

    Ok(AggregateReport { output_path, rows })
}

/// Main application struct that dispatches the subcommands
pub struct App {
    cli: Cli,
}

impl App {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    pub async fn run(self) -> Result<()> {
        if self.cli.debug {
            println!("{} v{}", crate::PKG_NAME, crate::VERSION);
            println!(
                "Built {} from {}",
                crate::BUILD_TIME,
                crate::GIT_COMMIT.unwrap_or("an unknown commit")
            );
            println!("Debug mode enabled");
            println!();
        }

        match &self.cli.command {
            Command::Run(_) => self.run_benchmark().await,
            Command::Aggregate(args) => self.aggregate(args),
            Command::InitEnv { path, force } => {
                EnvManager::save_example_env_file(path, *force)?;
                println!("Example configuration written to {}", path.display());
                Ok(())
            }
            Command::EnvHelp => {
                print!("{}", EnvManager::display_env_help());
                for problem in EnvManager::validate_current_env() {
                    println!("{}", problem);
                }
                Ok(())
            }
        }
    }

    async fn run_benchmark(&self) -> Result<()> {
        let config = load_config(self.cli.clone())?;
        let warnings = validate_config(&config)?;
        let formatter = OutputFormatterFactory::create_formatter(config.enable_color, config.verbose);

        if config.verbose || config.debug {
            println!("Configuration Summary:");
            println!("{}", display_config_summary(&config));
            println!();
        }

        for warning in &warnings {
            eprintln!("{}", warning.format(config.enable_color));
        }

        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner::new(config.debug));
        let benchmark = BenchmarkRunner::new(config, runner).await?;
        let summary = benchmark.run().await?;

        println!();
        println!("{}", formatter.format_header("Transfer Benchmark Results")?);
        println!("{}", formatter.format_run_summary(&summary)?);
        Ok(())
    }

    fn aggregate(&self, args: &AggregateArgs) -> Result<()> {
        let report = run_aggregate(args)?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&report.rows)?);
            return Ok(());
        }

        let formatter = OutputFormatterFactory::create_formatter(self.cli.use_colors(), self.cli.verbose);
        println!("{}", formatter.format_aggregate_table(&report.rows)?);
        println!(
            "{}",
            formatter.format_success(&format!("Wrote {}", report.output_path.display()))?
        );
        Ok(())
    }
}
