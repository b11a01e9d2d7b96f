//! Report command implementations

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::{report, Config, FinancialAdvisor, ReportComposer, ReportDocument};

use super::{resolve_user, user_snapshot, Snapshot};

/// Compose the report document for the resolved user
pub fn build_report(
    config: &Config,
    snapshot: &Snapshot,
    name: Option<&str>,
) -> Result<ReportDocument> {
    let (user, snapshot) = user_snapshot(snapshot)?;
    let user_name = name.unwrap_or(&user);

    let analysis = FinancialAdvisor::with_config(config.advisor.clone())
        .analyze(&snapshot.transactions, &snapshot.budgets);
    Ok(ReportComposer::new().compose(
        user_name,
        &snapshot.transactions,
        &analysis,
        &snapshot.budgets,
    ))
}

pub fn cmd_report(
    config: &Config,
    snapshot: &Snapshot,
    name: Option<&str>,
    format: &str,
    output: Option<&Path>,
) -> Result<()> {
    let doc = build_report(config, snapshot, name)?;

    let rendered = match format.to_lowercase().as_str() {
        "markdown" | "md" => doc.to_markdown(),
        "json" => doc.to_json()?,
        _ => anyhow::bail!("Unknown format: {}. Available: markdown, json", format),
    };

    match output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!(
                "✅ Report for {} written to {} ({} pages)",
                doc.user_name,
                path.display(),
                doc.pages.len()
            );
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

pub fn cmd_monthly(
    config: &Config,
    snapshot: &Snapshot,
    month: u32,
    year: i32,
    json: bool,
) -> Result<()> {
    let user = resolve_user(snapshot)?;
    let monthly = report::monthly_report_with(
        &user,
        month,
        year,
        &snapshot.transactions,
        &snapshot.budgets,
        &config.advisor,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&monthly)?);
        return Ok(());
    }

    let summary = &monthly.summary;
    println!();
    println!("🗓️  Monthly Report {} ({})", monthly.period, user);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Transactions:  {}", monthly.transaction_count);
    println!("   Income:        ${:.2}", summary.total_income);
    println!("   Expenses:      ${:.2}", summary.total_expense);
    println!("   Balance:       ${:.2}", summary.balance);
    println!(
        "   Trend:         {} ({:+.2}%)",
        monthly.trend.trend.as_str(),
        monthly.trend.pct_change
    );

    if !monthly.alerts.is_empty() {
        println!();
        for alert in &monthly.alerts {
            println!("   ⚠️  {}", alert.message);
        }
    }

    Ok(())
}
