//! Fintrack CLI - Personal finance analysis and alerts
//!
//! Usage:
//!   fintrack summary -t tx.csv                  Headline totals
//!   fintrack analyze -t tx.csv -b budgets.csv   Advisor recommendations
//!   fintrack alerts -t tx.csv -b budgets.csv    Budget and unusual-expense alerts
//!   fintrack report -t tx.csv -u u1 -o out.md   Full report

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = commands::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Validate { action } => match action {
            ValidateAction::Transactions { file } => commands::cmd_validate_transactions(&file),
            ValidateAction::User { email, name } => commands::cmd_validate_user(&email, &name),
        },
        Commands::Summary { snapshot } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_summary(&snapshot)
        }
        Commands::Analyze { snapshot, json } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_analyze(&config, &snapshot, json)
        }
        Commands::Alerts { snapshot } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_alerts(&config, &snapshot)
        }
        Commands::Trend {
            snapshot,
            window,
            as_of,
        } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_trend(&config, &snapshot, window, as_of.as_deref())
        }
        Commands::Outliers { snapshot, k } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_outliers(&config, &snapshot, k)
        }
        Commands::Report {
            snapshot,
            name,
            format,
            output,
        } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_report(
                &config,
                &snapshot,
                name.as_deref(),
                &format,
                output.as_deref(),
            )
        }
        Commands::Monthly {
            snapshot,
            month,
            year,
            json,
        } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_monthly(&config, &snapshot, month, year, json)
        }
        Commands::Export { snapshot, output } => {
            let snapshot = commands::load_snapshot(&snapshot)?;
            commands::cmd_export(&snapshot, &output)
        }
        Commands::Recommend { user } => commands::cmd_recommend(&config, &user).await,
    }
}
