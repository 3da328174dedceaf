pub mod export;
pub mod files;
pub mod init;
pub mod report;
pub mod status;
pub mod upload;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "finrep", about = "Monthly management-report ingestion and dashboards.")]
pub struct Cli {
    /// Log progress (info level) to stderr. FINREP_LOG overrides.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for finrep data (default: ~/Documents/finrep)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
        /// Entity sheet lookup: sheet (shared rows) or entity (per-entity rows)
        #[arg(long = "entity-scope")]
        entity_scope: Option<String>,
    },
    /// Upload a monthly report workbook and ingest its sheets.
    Upload {
        /// Path to the .xlsx/.xls/.ods workbook
        file: String,
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
        /// Parse and count records without saving anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List uploaded report files.
    Files,
    /// Show KPIs, trend, entities and red flags for a month.
    Dashboard {
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
    },
    /// List P&L line items of a month.
    Pnl {
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
        /// Filter: revenue, costs, gross_profit, net_profit
        #[arg(long)]
        target: Option<String>,
    },
    /// Cost, revenue or profitability analysis for a month.
    Analysis {
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
        /// Analysis kind: cost, revenue, profitability
        #[arg(long, default_value = "cost")]
        kind: String,
    },
    /// Margins and year-over-year growth for the 12 months to a month.
    Benchmark {
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
    },
    /// Export a month's line items to CSV.
    Export {
        /// Report month: YYYY-MM
        #[arg(long)]
        month: String,
        /// Output path (default: <data_dir>/exports/pnl-YYYY-MM.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// Delete a report, its records and its stored file.
    Delete {
        /// Report id (see `finrep files`)
        report_id: i64,
    },
    /// Show current database and summary statistics.
    Status,
}
