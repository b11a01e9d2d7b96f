//! Report composition
//!
//! Builds a paginated, renderer-neutral document from an analysis result and
//! the raw transactions. Charts are emitted as data series; turning them into
//! images is left to whatever renders the document.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::advisor::AnalysisResult;
use crate::alerts::{self, AlertEngine, BudgetStatus, NearLimitCutoff};
use crate::analyzer::{self, Trend, TransactionSummary};
use crate::config::AdvisorConfig;
use crate::error::{Error, Result};
use crate::models::{Budget, NewAlert, Transaction};

/// Number of transactions listed on the last page
pub const RECENT_TRANSACTIONS: usize = 20;

/// Format an amount as `$1,234.56`
pub fn format_currency(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = format!("{:.2}", amount.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}${}.{}", sign, grouped, frac)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

// ========== Monthly report ==========

/// Totals, trend and budget alerts for one user and calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyReport {
    /// `M/YYYY`
    pub period: String,
    pub summary: TransactionSummary,
    pub trend: Trend,
    pub alerts: Vec<NewAlert>,
    pub transaction_count: usize,
}

/// Build a monthly report with the default thresholds
pub fn monthly_report(
    user_id: &str,
    month: u32,
    year: i32,
    transactions: &[Transaction],
    budgets: &[Budget],
) -> Result<MonthlyReport> {
    monthly_report_with(user_id, month, year, transactions, budgets, &AdvisorConfig::default())
}

/// Build a monthly report; the trend is anchored at the last day of the month
pub fn monthly_report_with(
    user_id: &str,
    month: u32,
    year: i32,
    transactions: &[Transaction],
    budgets: &[Budget],
    config: &AdvisorConfig,
) -> Result<MonthlyReport> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidData(format!("Invalid month: {}/{}", month, year)))?;
    let last = last_day_of_month(first);

    let in_month: Vec<Transaction> = transactions
        .iter()
        .filter(|t| t.user_id == user_id && t.date.year() == year && t.date.month() == month)
        .cloned()
        .collect();

    Ok(MonthlyReport {
        period: format!("{}/{}", month, year),
        summary: analyzer::summarize(&in_month),
        trend: analyzer::compute_trend_with(
            &in_month,
            config.trend_window_days,
            last,
            config.trend_threshold_percent,
        ),
        alerts: AlertEngine::from_config(config).check_budgets(&in_month, budgets, user_id),
        transaction_count: in_month.len(),
    })
}

fn last_day_of_month(first: NaiveDate) -> NaiveDate {
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1)
        .and_then(|d| d.pred_opt())
        .unwrap_or(first)
}

// ========== Chart data ==========

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Series handed to an external plotting collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    /// Expense share per category (pie/donut)
    pub category_distribution: Vec<ChartPoint>,
    /// Summed expenses per day, oldest first (line)
    pub daily_expenses: Vec<DailyPoint>,
    /// Income, expenses and net savings (bar)
    pub summary_bars: Vec<ChartPoint>,
}

impl ChartData {
    pub fn build(transactions: &[Transaction], analysis: &AnalysisResult) -> Self {
        if transactions.is_empty() {
            return Self::default();
        }

        let category_distribution = analyzer::expenses_by_category(transactions)
            .into_iter()
            .map(|c| ChartPoint {
                label: c.category,
                value: c.amount,
            })
            .collect();

        let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for tx in transactions.iter().filter(|t| t.is_expense()) {
            *by_day.entry(tx.date).or_insert(0.0) += tx.amount;
        }
        let daily_expenses = by_day
            .into_iter()
            .map(|(date, amount)| DailyPoint { date, amount })
            .collect();

        let summary = &analysis.summary;
        let summary_bars = vec![
            ChartPoint {
                label: "Income".to_string(),
                value: summary.total_income,
            },
            ChartPoint {
                label: "Expenses".to_string(),
                value: summary.total_expense,
            },
            ChartPoint {
                label: "Net Savings".to_string(),
                value: summary.net_savings,
            },
        ];

        Self {
            category_distribution,
            daily_expenses,
            summary_bars,
        }
    }
}

// ========== Document model ==========

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Summary,
    CategoryDistribution,
    DailyExpenses,
}

impl ChartKind {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Summary => "Financial Summary",
            Self::CategoryDistribution => "Expense Distribution by Category",
            Self::DailyExpenses => "Daily Expense Trend",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionBody {
    Metrics { metrics: Vec<Metric> },
    Table { headers: Vec<String>, rows: Vec<Vec<String>> },
    List { ordered: bool, items: Vec<String> },
    Chart { chart: ChartKind },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: SectionBody,
}

impl Section {
    fn metrics(title: &str, metrics: Vec<Metric>) -> Self {
        Self {
            title: title.to_string(),
            body: SectionBody::Metrics { metrics },
        }
    }

    fn table(title: &str, headers: &[&str], rows: Vec<Vec<String>>) -> Self {
        Self {
            title: title.to_string(),
            body: SectionBody::Table {
                headers: headers.iter().map(|h| h.to_string()).collect(),
                rows,
            },
        }
    }

    fn list(title: &str, ordered: bool, items: Vec<String>) -> Self {
        Self {
            title: title.to_string(),
            body: SectionBody::List { ordered, items },
        }
    }

    fn chart(chart: ChartKind) -> Self {
        Self {
            title: format!("Chart: {}", chart.title()),
            body: SectionBody::Chart { chart },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPage {
    pub sections: Vec<Section>,
}

/// A complete, paginated report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub title: String,
    pub user_name: String,
    pub pages: Vec<ReportPage>,
    pub charts: ChartData,
}

impl ReportDocument {
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.pages
            .iter()
            .flat_map(|p| p.sections.iter())
            .find(|s| s.title == title)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render as Markdown; pages are separated by horizontal rules
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.title);

        for (i, page) in self.pages.iter().enumerate() {
            if i > 0 {
                out.push_str("\n---\n");
            }
            for section in &page.sections {
                let _ = writeln!(out, "\n## {}\n", section.title);
                self.render_body(&mut out, &section.body);
            }
        }

        out
    }

    fn render_body(&self, out: &mut String, body: &SectionBody) {
        match body {
            SectionBody::Metrics { metrics } => {
                for m in metrics {
                    let _ = writeln!(out, "- **{}:** {}", m.label, m.value);
                }
            }
            SectionBody::Table { headers, rows } => {
                let _ = writeln!(out, "| {} |", headers.join(" | "));
                let _ = writeln!(out, "|{}", "---|".repeat(headers.len()));
                for row in rows {
                    let _ = writeln!(out, "| {} |", row.join(" | "));
                }
            }
            SectionBody::List { ordered, items } => {
                for (i, item) in items.iter().enumerate() {
                    if *ordered {
                        let _ = writeln!(out, "{}. {}", i + 1, item);
                    } else {
                        let _ = writeln!(out, "- {}", item);
                    }
                }
            }
            SectionBody::Chart { chart } => {
                let points: Vec<String> = match chart {
                    ChartKind::Summary => self
                        .charts
                        .summary_bars
                        .iter()
                        .map(|p| format!("{}: {}", p.label, format_currency(p.value)))
                        .collect(),
                    ChartKind::CategoryDistribution => self
                        .charts
                        .category_distribution
                        .iter()
                        .map(|p| format!("{}: {}", p.label, format_currency(p.value)))
                        .collect(),
                    ChartKind::DailyExpenses => self
                        .charts
                        .daily_expenses
                        .iter()
                        .map(|p| format!("{}: {}", p.date, format_currency(p.amount)))
                        .collect(),
                };
                let _ = writeln!(out, "_{} data points_\n", points.len());
                for p in points {
                    let _ = writeln!(out, "- {}", p);
                }
            }
        }
    }
}

/// Assembles a [`ReportDocument`] from an analysis and its inputs
pub struct ReportComposer {
    title: String,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportComposer {
    pub fn new() -> Self {
        Self {
            title: "Personal Finance Report".to_string(),
        }
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    pub fn compose(
        &self,
        user_name: &str,
        transactions: &[Transaction],
        analysis: &AnalysisResult,
        budgets: &[Budget],
    ) -> ReportDocument {
        let charts = ChartData::build(transactions, analysis);
        let summary = &analysis.summary;
        let mut pages = Vec::new();

        // Page 1: who and headline numbers
        let mut overview = ReportPage::default();
        overview.sections.push(Section::metrics(
            "User Information",
            vec![
                Metric::new("User", user_name),
                Metric::new(
                    "Period analyzed",
                    format!("{} transactions", transactions.len()),
                ),
            ],
        ));
        overview.sections.push(Section::metrics(
            "Executive Summary",
            vec![
                Metric::new("Total income", format_currency(summary.total_income)),
                Metric::new("Total expenses", format_currency(summary.total_expense)),
                Metric::new("Net savings", format_currency(summary.net_savings)),
                Metric::new("Savings rate", format!("{:.1}%", summary.savings_rate)),
            ],
        ));
        if !charts.summary_bars.is_empty() {
            overview.sections.push(Section::chart(ChartKind::Summary));
        }
        pages.push(overview);

        // Page 2: where the money went
        let mut categories = ReportPage::default();
        let mut by_category = analyzer::expenses_by_category(transactions);
        if !by_category.is_empty() {
            by_category.sort_by(|a, b| b.amount.partial_cmp(&a.amount).unwrap_or(Ordering::Equal));
            let rows = by_category
                .iter()
                .map(|c| {
                    let share = if summary.total_expense > 0.0 {
                        c.amount / summary.total_expense * 100.0
                    } else {
                        0.0
                    };
                    vec![
                        c.category.clone(),
                        format_currency(c.amount),
                        format!("{:.1}%", share),
                    ]
                })
                .collect();
            categories.sections.push(Section::table(
                "Expenses by Category",
                &["Category", "Amount", "Share"],
                rows,
            ));
            categories
                .sections
                .push(Section::chart(ChartKind::CategoryDistribution));
        }
        pages.push(categories);

        // Page 3: trend, budgets, advice
        let mut advice = ReportPage::default();
        if !charts.daily_expenses.is_empty() {
            advice.sections.push(Section::chart(ChartKind::DailyExpenses));
        }

        let expenses = analyzer::expenses_by_category(transactions);
        let deduped = alerts::dedupe_categories(budgets);
        let mut usages =
            alerts::evaluate_budgets(&expenses, &deduped, NearLimitCutoff::Above(100.0));
        if !usages.is_empty() {
            usages.sort_by(|a, b| a.category.cmp(&b.category));
            let rows = usages
                .iter()
                .map(|u| {
                    let state = if u.status == BudgetStatus::Exceeded {
                        "EXCEEDED"
                    } else {
                        "OK"
                    };
                    vec![
                        truncate(&u.category, 20),
                        format_currency(u.spent),
                        format_currency(u.limit),
                        format!("{:.1}%", u.percent),
                        state.to_string(),
                    ]
                })
                .collect();
            advice.sections.push(Section::table(
                "Budget Comparison",
                &["Category", "Actual", "Budget", "% Used", "Status"],
                rows,
            ));
        }

        advice.sections.push(Section::list(
            "Recommendations",
            true,
            analysis.recommendations.clone(),
        ));
        if !analysis.alerts.is_empty() {
            advice
                .sections
                .push(Section::list("Alerts", false, analysis.alerts.clone()));
        }
        advice.sections.push(Section::metrics(
            "Financial Projections",
            vec![
                Metric::new(
                    "Projected savings (3 months)",
                    format_currency(analysis.projections.savings_3mo),
                ),
                Metric::new(
                    "Next month's expenses",
                    format_currency(analysis.projections.next_month_expense),
                ),
            ],
        ));
        pages.push(advice);

        // Page 4: recent activity
        if !transactions.is_empty() {
            let mut recent: Vec<&Transaction> = transactions.iter().collect();
            recent.sort_by(|a, b| b.date.cmp(&a.date));
            let rows = recent
                .into_iter()
                .take(RECENT_TRANSACTIONS)
                .map(|t| {
                    vec![
                        t.date.to_string(),
                        truncate(&t.category, 15),
                        truncate(&t.description, 35),
                        format_currency(t.amount),
                        t.tx_type.as_str().to_string(),
                    ]
                })
                .collect();
            let mut activity = ReportPage::default();
            activity.sections.push(Section::table(
                "Recent Transactions",
                &["Date", "Category", "Description", "Amount", "Type"],
                rows,
            ));
            pages.push(activity);
        }

        ReportDocument {
            title: self.title.clone(),
            user_name: user_name.to_string(),
            pages,
            charts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor;
    use crate::models::{AlertKind, BudgetPeriod, TransactionType};

    fn tx(
        id: &str,
        amount: f64,
        category: &str,
        on: (i32, u32, u32),
        tx_type: TransactionType,
    ) -> Transaction {
        Transaction::new(
            id,
            "u1",
            amount,
            category,
            format!("{} entry", category),
            NaiveDate::from_ymd_opt(on.0, on.1, on.2).unwrap(),
            tx_type,
        )
    }

    fn sample() -> Vec<Transaction> {
        vec![
            tx("i1", 3000.0, "Salary", (2024, 5, 1), TransactionType::Income),
            tx("e1", 120.0, "Food", (2024, 5, 3), TransactionType::Expense),
            tx("e2", 900.0, "Rent", (2024, 5, 1), TransactionType::Expense),
            tx("e3", 30.0, "Food", (2024, 5, 3), TransactionType::Expense),
            tx("e4", 60.0, "Transport", (2024, 4, 28), TransactionType::Expense),
        ]
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.5), "$12.50");
        assert_eq!(format_currency(1234.567), "$1,234.57");
        assert_eq!(format_currency(1234567.0), "$1,234,567.00");
        assert_eq!(format_currency(-950.0), "-$950.00");
    }

    #[test]
    fn test_chart_data() {
        let txs = sample();
        let analysis = advisor::analyze(&txs, &[]);
        let charts = ChartData::build(&txs, &analysis);

        assert_eq!(charts.category_distribution.len(), 3);
        assert_eq!(charts.category_distribution[0].label, "Food");
        assert_eq!(charts.category_distribution[0].value, 150.0);

        let days: Vec<String> = charts
            .daily_expenses
            .iter()
            .map(|p| p.date.to_string())
            .collect();
        assert_eq!(days, vec!["2024-04-28", "2024-05-01", "2024-05-03"]);
        assert_eq!(charts.daily_expenses[2].amount, 150.0);

        assert_eq!(charts.summary_bars[2].value, analysis.summary.net_savings);
    }

    #[test]
    fn test_compose_pages() {
        let txs = sample();
        let budgets = vec![
            Budget::new("b1", "u1", "Rent", 800.0, BudgetPeriod::Monthly),
            Budget::new("b2", "u1", "Food", 200.0, BudgetPeriod::Monthly),
            Budget::new("b3", "u1", "Travel", 500.0, BudgetPeriod::Monthly),
        ];
        let analysis = advisor::analyze(&txs, &budgets);
        let doc = ReportComposer::new().compose("Ana", &txs, &analysis, &budgets);

        assert_eq!(doc.pages.len(), 4);

        match &doc.section("Expenses by Category").unwrap().body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows[0][0], "Rent");
                assert_eq!(rows[0][1], "$900.00");
                assert_eq!(rows[0][2], "81.1%");
            }
            other => panic!("unexpected body: {:?}", other),
        }

        match &doc.section("Budget Comparison").unwrap().body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows.len(), 2);
                assert_eq!(rows[0][0], "Food");
                assert_eq!(rows[0][4], "OK");
                assert_eq!(rows[1][0], "Rent");
                assert_eq!(rows[1][4], "EXCEEDED");
            }
            other => panic!("unexpected body: {:?}", other),
        }

        match &doc.section("Recent Transactions").unwrap().body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows.len(), 5);
                assert_eq!(rows[0][0], "2024-05-03");
                assert_eq!(rows[4][0], "2024-04-28");
            }
            other => panic!("unexpected body: {:?}", other),
        }

        assert!(doc.section("Alerts").is_some());
    }

    #[test]
    fn test_budget_table_has_one_row_per_category() {
        let txs = sample();
        let budgets = vec![
            Budget::new("b1", "u1", "Food", 200.0, BudgetPeriod::Monthly),
            Budget::new("b2", "u2", "Food", 100.0, BudgetPeriod::Monthly),
        ];
        let analysis = advisor::analyze(&txs, &budgets);
        let doc = ReportComposer::new().compose("Ana", &txs, &analysis, &budgets);

        match &doc.section("Budget Comparison").unwrap().body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][2], "$200.00");
                assert_eq!(rows[0][4], "OK");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_compose_empty_snapshot() {
        let analysis = advisor::analyze(&[], &[]);
        let doc = ReportComposer::new().compose("Ana", &[], &analysis, &[]);

        assert_eq!(doc.pages.len(), 3);
        assert!(doc.section("Recent Transactions").is_none());
        assert!(doc.section("Alerts").is_none());
        assert!(doc.section("Chart: Financial Summary").is_none());

        let md = doc.to_markdown();
        assert!(md.starts_with("# Personal Finance Report"));
        assert!(md.contains("1. Not enough data to generate recommendations"));
    }

    #[test]
    fn test_recent_transactions_capped() {
        let txs: Vec<Transaction> = (1..=25)
            .map(|d| {
                tx(
                    &format!("e{}", d),
                    10.0,
                    "Food",
                    (2024, 1, d),
                    TransactionType::Expense,
                )
            })
            .collect();
        let analysis = advisor::analyze(&txs, &[]);
        let doc = ReportComposer::new().compose("Ana", &txs, &analysis, &[]);

        match &doc.section("Recent Transactions").unwrap().body {
            SectionBody::Table { rows, .. } => {
                assert_eq!(rows.len(), RECENT_TRANSACTIONS);
                assert_eq!(rows[0][0], "2024-01-25");
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }

    #[test]
    fn test_markdown_and_json_render() {
        let txs = sample();
        let analysis = advisor::analyze(&txs, &[]);
        let doc = ReportComposer::with_title("May Report").compose("Ana", &txs, &analysis, &[]);

        let md = doc.to_markdown();
        assert!(md.starts_with("# May Report"));
        assert!(md.contains("## Executive Summary"));
        assert!(md.contains("- **Total income:** $3,000.00"));
        assert!(md.contains("| Category | Amount | Share |"));

        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(json["user_name"], "Ana");
        assert_eq!(json["pages"][0]["sections"][0]["body"]["kind"], "metrics");
    }

    #[test]
    fn test_monthly_report() {
        let mut txs = sample();
        let mut other_user = tx("x1", 999.0, "Food", (2024, 5, 2), TransactionType::Expense);
        other_user.user_id = "u2".into();
        txs.push(other_user);
        let budgets = vec![Budget::new("b1", "u1", "Rent", 800.0, BudgetPeriod::Monthly)];

        let report = monthly_report("u1", 5, 2024, &txs, &budgets).unwrap();
        assert_eq!(report.period, "5/2024");
        assert_eq!(report.transaction_count, 4);
        assert_eq!(report.summary.total_expense, 1050.0);
        assert_eq!(report.alerts.len(), 1);
        assert_eq!(report.alerts[0].kind, AlertKind::BudgetExceeded);
    }

    #[test]
    fn test_monthly_report_rejects_bad_month() {
        assert!(monthly_report("u1", 13, 2024, &[], &[]).is_err());
    }

    #[test]
    fn test_last_day_of_month() {
        let feb = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(last_day_of_month(feb).day(), 29);
        let dec = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        assert_eq!(last_day_of_month(dec), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }
}
