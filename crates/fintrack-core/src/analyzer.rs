//! Aggregations over a snapshot of transactions
//!
//! Every function here is total: empty or degenerate input yields a zeroed
//! result instead of an error.

use std::collections::HashMap;

use chrono::{Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Transaction;

/// Default number of standard deviations for unusual expenses
pub const DEFAULT_OUTLIER_K: f64 = 2.0;

/// Default trailing window for trend detection
pub const DEFAULT_TREND_WINDOW_DAYS: u32 = 30;

/// Default percent change separating rising/falling from stable
pub const DEFAULT_TREND_THRESHOLD: f64 = 10.0;

/// Headline numbers for a set of transactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub count: usize,
    pub total_income: f64,
    pub total_expense: f64,
    pub balance: f64,
    pub avg_expense: f64,
    pub top_expense_category: Option<String>,
    pub top_expense_amount: f64,
}

/// Summed expenses for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Rising,
    Falling,
    Stable,
    NoData,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rising => "rising",
            Self::Falling => "falling",
            Self::Stable => "stable",
            Self::NoData => "no_data",
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Expense trend between the two halves of a trailing window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub trend: TrendDirection,
    pub pct_change: f64,
    pub period1_total: f64,
    pub period2_total: f64,
}

impl Trend {
    fn no_data(period1_total: f64, period2_total: f64) -> Self {
        Self {
            trend: TrendDirection::NoData,
            pct_change: 0.0,
            period1_total,
            period2_total,
        }
    }
}

/// Group expenses by category, in the order each category first appears
pub fn expenses_by_category(transactions: &[Transaction]) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for tx in transactions.iter().filter(|t| t.is_expense()) {
        match index.get(tx.category.as_str()) {
            Some(&i) => {
                totals[i].amount += tx.amount;
                totals[i].count += 1;
            }
            None => {
                index.insert(tx.category.as_str(), totals.len());
                totals.push(CategoryTotal {
                    category: tx.category.clone(),
                    amount: tx.amount,
                    count: 1,
                });
            }
        }
    }

    totals
}

/// Category with the largest summed expense; ties go to the first seen
pub fn top_category(totals: &[CategoryTotal]) -> Option<&CategoryTotal> {
    let mut best: Option<&CategoryTotal> = None;
    for total in totals {
        if best.map_or(true, |b| total.amount > b.amount) {
            best = Some(total);
        }
    }
    best
}

pub fn total_income(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_income())
        .map(|t| t.amount)
        .sum()
}

pub fn total_expense(transactions: &[Transaction]) -> f64 {
    transactions
        .iter()
        .filter(|t| t.is_expense())
        .map(|t| t.amount)
        .sum()
}

pub fn summarize(transactions: &[Transaction]) -> TransactionSummary {
    if transactions.is_empty() {
        return TransactionSummary::default();
    }

    let total_income = total_income(transactions);
    let total_expense = total_expense(transactions);
    let expense_count = transactions.iter().filter(|t| t.is_expense()).count();

    let avg_expense = if expense_count > 0 {
        total_expense / expense_count as f64
    } else {
        0.0
    };

    let by_category = expenses_by_category(transactions);
    let top = top_category(&by_category);

    TransactionSummary {
        count: transactions.len(),
        total_income,
        total_expense,
        balance: total_income - total_expense,
        avg_expense,
        top_expense_category: top.map(|t| t.category.clone()),
        top_expense_amount: top.map_or(0.0, |t| t.amount),
    }
}

/// Expenses at or above `mean + k * stddev` of all expense amounts
///
/// Uses the population standard deviation. The comparison is inclusive: an
/// expense exactly at the threshold is reported. Fewer than two expenses, or
/// a zero deviation, report nothing.
pub fn detect_outliers(transactions: &[Transaction], k: f64) -> Vec<Transaction> {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| t.is_expense()).collect();

    if expenses.len() < 2 {
        return Vec::new();
    }

    let n = expenses.len() as f64;
    let mean = expenses.iter().map(|t| t.amount).sum::<f64>() / n;
    let variance = expenses
        .iter()
        .map(|t| (t.amount - mean).powi(2))
        .sum::<f64>()
        / n;
    let std_dev = variance.sqrt();

    if std_dev == 0.0 || !std_dev.is_finite() {
        return Vec::new();
    }

    let threshold = mean + k * std_dev;
    tracing::debug!(mean, std_dev, threshold, "Outlier threshold computed");

    expenses
        .into_iter()
        .filter(|t| t.amount >= threshold)
        .cloned()
        .collect()
}

/// Trend over the trailing `window_days` ending today
pub fn compute_trend(transactions: &[Transaction], window_days: u32) -> Trend {
    compute_trend_at(transactions, window_days, Local::now().date_naive())
}

/// Trend over the trailing `window_days` ending at `today`
pub fn compute_trend_at(transactions: &[Transaction], window_days: u32, today: NaiveDate) -> Trend {
    compute_trend_with(transactions, window_days, today, DEFAULT_TREND_THRESHOLD)
}

/// Trend with an explicit rising/falling threshold (percent)
///
/// The first half covers `[today - window, today - window/2)`, the second
/// `[today - window/2, today]`.
pub fn compute_trend_with(
    transactions: &[Transaction],
    window_days: u32,
    today: NaiveDate,
    threshold_percent: f64,
) -> Trend {
    if transactions.is_empty() {
        return Trend::no_data(0.0, 0.0);
    }

    // Windows reaching past the earliest representable date start there
    let days_back = |days: u32| {
        today
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(NaiveDate::MIN)
    };
    let start = days_back(window_days);
    let mid = days_back(window_days / 2);

    let mut period1 = 0.0;
    let mut period2 = 0.0;
    for tx in transactions.iter().filter(|t| t.is_expense()) {
        if tx.date >= start && tx.date < mid {
            period1 += tx.amount;
        } else if tx.date >= mid && tx.date <= today {
            period2 += tx.amount;
        }
    }

    if period1 == 0.0 {
        return Trend::no_data(period1, period2);
    }

    let pct_change = round2((period2 - period1) / period1 * 100.0);
    let trend = if pct_change > threshold_percent {
        TrendDirection::Rising
    } else if pct_change < -threshold_percent {
        TrendDirection::Falling
    } else {
        TrendDirection::Stable
    };

    Trend {
        trend,
        pct_change,
        period1_total: period1,
        period2_total: period2,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
