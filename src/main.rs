mod cell;
mod classify;
mod cli;
mod db;
mod error;
mod fmt;
mod importer;
mod ingest;
mod models;
mod reports;
mod settings;
mod store;
mod workbook;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn init_logging(verbose: bool) {
    let default = if verbose { "finrep=info" } else { "warn" };
    let filter = EnvFilter::try_from_env("FINREP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init {
            data_dir,
            entity_scope,
        } => cli::init::run(data_dir, entity_scope.as_deref()),
        Commands::Upload {
            file,
            month,
            dry_run,
        } => cli::upload::run(&file, &month, dry_run),
        Commands::Files => cli::files::list(),
        Commands::Dashboard { month } => cli::report::dashboard(&month),
        Commands::Pnl { month, target } => cli::report::pnl(&month, target.as_deref()),
        Commands::Analysis { month, kind } => cli::report::analysis(&month, &kind),
        Commands::Benchmark { month } => cli::report::benchmark(&month),
        Commands::Export { month, output } => cli::export::run(&month, output),
        Commands::Delete { report_id } => cli::files::delete(report_id),
        Commands::Status => cli::status::run(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
