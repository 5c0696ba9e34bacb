//! Transfer Benchmark - command-line entry point

use clap::Parser;
use std::process;
use transfer_benchmark::{
    cli::{Cli, Command},
    error::ErrorReporter,
    App,
};

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        eprintln!("This is a bug; please report it with the command line you used.");
        process::exit(99);
    }));

    let cli = Cli::parse();

    if let Err(message) = cli.validate() {
        eprintln!("Error: {}", message);
        process::exit(1);
    }

    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug)
        .for_benchmark_run(matches!(cli.command, Command::Run(_)));

    if let Err(e) = App::new(cli).run().await {
        reporter.report_error(&e);
        reporter.print_suggestions(&e);
        process::exit(e.exit_code());
    }
}
