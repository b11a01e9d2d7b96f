//! Analysis command implementations (validate, summary, analyze, alerts, trend, outliers)

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use fintrack_core::{
    advisor::FinancialAdvisor, analyzer, import, validate, AlertEngine, Config, Severity,
};

use super::{truncate, user_snapshot, Snapshot};

pub fn cmd_validate_transactions(file: &Path) -> Result<()> {
    let report = import::load_transactions(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    println!();
    println!("🔎 Validation: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Valid rows:    {}", report.transactions.len());
    println!("   Invalid rows:  {}", report.rejected.len());

    if report.is_clean() {
        println!();
        println!("✅ All rows are valid");
        return Ok(());
    }

    println!();
    for row in &report.rejected {
        println!("   Line {:>4}: {}", row.line, row.errors.join("; "));
    }

    anyhow::bail!("{} invalid row(s)", report.rejected.len())
}

pub fn cmd_validate_user(email: &str, name: &str) -> Result<()> {
    let report = validate::validate_user(email, name);
    if report.valid {
        println!("✅ User is valid");
        return Ok(());
    }

    for error in &report.errors {
        println!("   ❌ {}", error);
    }
    anyhow::bail!("Invalid user")
}

pub fn cmd_summary(snapshot: &Snapshot) -> Result<()> {
    let summary = analyzer::summarize(&snapshot.transactions);

    println!();
    println!("📊 Transaction Summary");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Transactions:  {}", summary.count);
    println!("   Income:        ${:.2}", summary.total_income);
    println!("   Expenses:      ${:.2}", summary.total_expense);
    println!("   Balance:       ${:.2}", summary.balance);
    println!("   Avg expense:   ${:.2}", summary.avg_expense);
    if let Some(top) = &summary.top_expense_category {
        println!(
            "   Top category:  {} (${:.2})",
            top, summary.top_expense_amount
        );
    }

    let categories = analyzer::expenses_by_category(&snapshot.transactions);
    if !categories.is_empty() {
        println!();
        println!("   {:25} │ {:>10} │ {:>5}", "Category", "Amount", "Count");
        println!("   ──────────────────────────┼────────────┼───────");
        for cat in &categories {
            println!(
                "   {:25} │ {:>10.2} │ {:>5}",
                truncate(&cat.category, 25),
                cat.amount,
                cat.count
            );
        }
    }

    Ok(())
}

pub fn cmd_analyze(config: &Config, snapshot: &Snapshot, json: bool) -> Result<()> {
    let (user, snapshot) = user_snapshot(snapshot)?;
    let advisor = FinancialAdvisor::with_config(config.advisor.clone());
    let result = advisor.analyze(&snapshot.transactions, &snapshot.budgets);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let summary = &result.summary;
    println!();
    println!("💡 Financial Analysis ({})", user);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Income:        ${:.2}", summary.total_income);
    println!("   Expenses:      ${:.2}", summary.total_expense);
    println!("   Net savings:   ${:.2}", summary.net_savings);
    println!("   Savings rate:  {:.1}%", summary.savings_rate);

    if !result.alerts.is_empty() {
        println!();
        println!("   Budget alerts:");
        for alert in &result.alerts {
            println!("   ⚠️  {}", alert);
        }
    }

    println!();
    println!("   Recommendations:");
    for (i, rec) in result.recommendations.iter().enumerate() {
        println!("   {}. {}", i + 1, rec);
    }

    println!();
    println!("   Projections:");
    println!(
        "   Savings ({} months):  ${:.2}",
        config.advisor.projection_months, result.projections.savings_3mo
    );
    println!(
        "   Next month expenses: ${:.2}",
        result.projections.next_month_expense
    );

    Ok(())
}

pub fn cmd_alerts(config: &Config, snapshot: &Snapshot) -> Result<()> {
    let engine = AlertEngine::from_config(&config.advisor);
    let users = match &snapshot.user {
        Some(user) => vec![user.clone()],
        None => snapshot.users(),
    };

    println!();
    println!("🔔 Alerts");
    println!("   ─────────────────────────────────────────────────────────────");

    let mut total = 0;
    for user in &users {
        let alerts = engine.run_all(&snapshot.transactions, &snapshot.budgets, user);
        if alerts.is_empty() {
            continue;
        }
        total += alerts.len();

        println!();
        println!("   User {}:", user);
        for alert in &alerts {
            let icon = match alert.severity {
                Severity::High => "🔴",
                Severity::Medium => "🟡",
                Severity::Low => "🔵",
            };
            println!("   {} [{}] {}", icon, alert.kind.label(), alert.message);
        }
    }

    if total == 0 {
        println!("   No alerts. Everything is within budget.");
    }

    Ok(())
}

pub fn cmd_trend(
    config: &Config,
    snapshot: &Snapshot,
    window: Option<u32>,
    as_of: Option<&str>,
) -> Result<()> {
    let window = window.unwrap_or(config.advisor.trend_window_days);
    if window < 2 {
        anyhow::bail!("Window must be at least 2 days");
    }
    let today = match as_of {
        Some(date) => NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .context("Invalid --as-of date format (use YYYY-MM-DD)")?,
        None => Local::now().date_naive(),
    };

    let trend = analyzer::compute_trend_with(
        &snapshot.transactions,
        window,
        today,
        config.advisor.trend_threshold_percent,
    );

    println!();
    println!("📈 Spending Trend ({} days ending {})", window, today);
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   First half:   ${:.2}", trend.period1_total);
    println!("   Second half:  ${:.2}", trend.period2_total);
    println!(
        "   Change:       {:+.2}% ({})",
        trend.pct_change,
        trend.trend.as_str()
    );

    Ok(())
}

pub fn cmd_outliers(config: &Config, snapshot: &Snapshot, k: Option<f64>) -> Result<()> {
    let k = k.unwrap_or(config.advisor.outlier_k);
    if k < 0.0 {
        anyhow::bail!("k must be non-negative");
    }
    let outliers = analyzer::detect_outliers(&snapshot.transactions, k);

    println!();
    println!("🚨 Unusual Expenses (k = {})", k);
    println!("   ─────────────────────────────────────────────────────────────");

    if outliers.is_empty() {
        println!("   No unusual expenses found.");
        return Ok(());
    }

    for tx in &outliers {
        println!(
            "   {} │ {:>10.2} │ {:15} │ {}",
            tx.date,
            tx.amount,
            truncate(&tx.category, 15),
            truncate(&tx.description, 30)
        );
    }

    Ok(())
}

