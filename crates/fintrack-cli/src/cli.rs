//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Fintrack - Personal finance analysis and alerts
#[derive(Parser)]
#[command(name = "fintrack")]
#[command(about = "Analyze transaction snapshots, check budgets and build reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file (defaults to the data directory override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Snapshot files shared by most commands
#[derive(Args, Debug, Clone)]
pub struct SnapshotArgs {
    /// Transactions file (.csv or .json)
    #[arg(short, long)]
    pub transactions: PathBuf,

    /// Budgets file (.csv or .json)
    #[arg(short, long)]
    pub budgets: Option<PathBuf>,

    /// Only consider this user's transactions and budgets
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate input records
    Validate {
        #[command(subcommand)]
        action: ValidateAction,
    },

    /// Print headline totals
    Summary {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Run the financial advisor
    Analyze {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate budget and unusual-expense alerts
    Alerts {
        #[command(flatten)]
        snapshot: SnapshotArgs,
    },

    /// Compare spending between the halves of a trailing window
    Trend {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Window length in days (defaults to config)
        #[arg(short, long)]
        window: Option<u32>,

        /// Reference date YYYY-MM-DD (defaults to today)
        #[arg(long)]
        as_of: Option<String>,
    },

    /// List unusually large expenses
    Outliers {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Standard deviations above the mean (defaults to config)
        #[arg(short, long)]
        k: Option<f64>,
    },

    /// Build the full paginated report
    Report {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Name shown on the report (defaults to the user id)
        #[arg(short, long)]
        name: Option<String>,

        /// Output format: markdown, json
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Summarize one calendar month
    Monthly {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Month (1-12)
        #[arg(short, long)]
        month: u32,

        /// Year
        #[arg(short, long)]
        year: i32,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export validated transactions to CSV or JSON
    Export {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Output file (format from extension)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Fetch recommendations from the configured webhook
    Recommend {
        /// User id sent to the webhook
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
pub enum ValidateAction {
    /// Validate every row of a transactions file
    Transactions {
        /// Transactions file (.csv or .json)
        file: PathBuf,
    },
    /// Validate a user's email and name
    User {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
    },
}
