//! Alert rule engine
//!
//! Rules:
//! - Budget ceilings: spend over a budget is `budget_exceeded`/high, spend at
//!   or above the near-limit threshold is `budget_near_limit`/medium
//!   (the advisor uses a strictly-above cutoff instead, see [`NearLimitCutoff`])
//! - Unusual expenses: statistical outliers from the analyzer are
//!   `unusual_expense`/medium
//!
//! Budget thresholds live in [`evaluate_budgets`], which the advisor reuses so
//! both report the same ordering (exceeded wins over near-limit).

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analyzer::{self, CategoryTotal};
use crate::config::AdvisorConfig;
use crate::models::{AlertKind, Budget, NewAlert, Severity, Transaction};

/// Where a category stands against its budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Ok,
    NearLimit,
    Exceeded,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NearLimit => "near_limit",
            Self::Exceeded => "exceeded",
        }
    }
}

/// Spend in one category compared with its budget ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetUsage {
    pub budget_id: String,
    pub category: String,
    pub spent: f64,
    pub limit: f64,
    /// Percent of the ceiling used; 0 when the ceiling is not positive
    pub percent: f64,
    pub status: BudgetStatus,
}

impl BudgetUsage {
    pub fn overage(&self) -> f64 {
        (self.spent - self.limit).max(0.0)
    }
}

/// Drop repeated (user, category) budgets, keeping the first one listed
pub fn dedupe_budgets<'a>(budgets: impl IntoIterator<Item = &'a Budget>) -> Vec<&'a Budget> {
    dedupe_by(budgets, |b| (b.user_id.as_str(), b.category.as_str()))
}

/// Keep one budget per category regardless of owner, first listed wins
///
/// For callers without a user scope, such as the advisor, so a category is
/// never reported twice.
pub fn dedupe_categories<'a>(budgets: impl IntoIterator<Item = &'a Budget>) -> Vec<&'a Budget> {
    dedupe_by(budgets, |b| b.category.as_str())
}

fn dedupe_by<'a, K, F>(budgets: impl IntoIterator<Item = &'a Budget>, key: F) -> Vec<&'a Budget>
where
    K: Eq + Hash,
    F: Fn(&'a Budget) -> K,
{
    let mut seen: HashSet<K> = HashSet::new();
    let mut kept = Vec::new();

    for budget in budgets {
        if seen.insert(key(budget)) {
            kept.push(budget);
        } else {
            warn!(
                budget_id = %budget.id,
                user_id = %budget.user_id,
                category = %budget.category,
                "Ignoring duplicate budget for category"
            );
        }
    }

    kept
}

/// Near-limit cutoff, in percent of the ceiling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NearLimitCutoff {
    /// `percent >= cutoff`
    AtLeast(f64),
    /// `percent > cutoff`
    Above(f64),
}

impl NearLimitCutoff {
    pub fn reached(&self, percent: f64) -> bool {
        match *self {
            Self::AtLeast(cutoff) => percent >= cutoff,
            Self::Above(cutoff) => percent > cutoff,
        }
    }
}

/// Compare per-category expenses with budget ceilings
///
/// Only budgets whose category has positive spend are returned, in budget
/// order. Exceeded (`spent > limit`) is checked before near-limit.
pub fn evaluate_budgets(
    expenses: &[CategoryTotal],
    budgets: &[&Budget],
    near_limit: NearLimitCutoff,
) -> Vec<BudgetUsage> {
    let mut usages = Vec::new();

    for budget in budgets {
        let Some(total) = expenses.iter().find(|e| e.category == budget.category) else {
            continue;
        };
        if total.amount <= 0.0 {
            continue;
        }

        let spent = total.amount;
        let limit = budget.max_amount;
        let percent = if limit > 0.0 {
            spent / limit * 100.0
        } else {
            0.0
        };

        let status = if spent > limit {
            BudgetStatus::Exceeded
        } else if near_limit.reached(percent) {
            BudgetStatus::NearLimit
        } else {
            BudgetStatus::Ok
        };

        usages.push(BudgetUsage {
            budget_id: budget.id.clone(),
            category: budget.category.clone(),
            spent,
            limit,
            percent,
            status,
        });
    }

    usages
}

/// Rule engine producing alerts from a snapshot of transactions and budgets
#[derive(Debug, Clone)]
pub struct AlertEngine {
    near_limit_percent: f64,
    outlier_k: f64,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertEngine {
    pub fn new() -> Self {
        Self::from_config(&AdvisorConfig::default())
    }

    pub fn from_config(config: &AdvisorConfig) -> Self {
        Self {
            near_limit_percent: config.alert_near_limit_percent,
            outlier_k: config.outlier_k,
        }
    }

    /// Budget alerts for one user
    pub fn check_budgets(
        &self,
        transactions: &[Transaction],
        budgets: &[Budget],
        user_id: &str,
    ) -> Vec<NewAlert> {
        let user_transactions: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        let expenses = analyzer::expenses_by_category(&user_transactions);
        if expenses.is_empty() {
            return Vec::new();
        }

        let user_budgets = dedupe_budgets(budgets.iter().filter(|b| b.user_id == user_id));
        let usages = evaluate_budgets(
            &expenses,
            &user_budgets,
            NearLimitCutoff::AtLeast(self.near_limit_percent),
        );

        let alerts: Vec<NewAlert> = usages
            .into_iter()
            .filter_map(|usage| budget_alert(user_id, &usage))
            .collect();

        debug!(user_id, count = alerts.len(), "Budget check complete");
        alerts
    }

    /// One alert per unusually large expense
    pub fn check_unusual_patterns(&self, transactions: &[Transaction]) -> Vec<NewAlert> {
        analyzer::detect_outliers(transactions, self.outlier_k)
            .into_iter()
            .map(|tx| {
                NewAlert::new(
                    tx.user_id.clone(),
                    AlertKind::UnusualExpense,
                    Severity::Medium,
                    format!(
                        "Unusual expense detected: ${:.2} in {} - {}",
                        tx.amount, tx.category, tx.description
                    ),
                )
                .with_category(tx.category)
                .with_amount(tx.amount)
            })
            .collect()
    }

    /// Budget and unusual-expense alerts for one user, most severe first
    pub fn run_all(
        &self,
        transactions: &[Transaction],
        budgets: &[Budget],
        user_id: &str,
    ) -> Vec<NewAlert> {
        let mut alerts = self.check_budgets(transactions, budgets, user_id);

        let user_transactions: Vec<Transaction> = transactions
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        alerts.extend(self.check_unusual_patterns(&user_transactions));

        alerts.sort_by(|a, b| b.severity.priority().cmp(&a.severity.priority()));
        alerts
    }
}

fn budget_alert(user_id: &str, usage: &BudgetUsage) -> Option<NewAlert> {
    let alert = match usage.status {
        BudgetStatus::Exceeded => NewAlert::new(
            user_id,
            AlertKind::BudgetExceeded,
            Severity::High,
            format!(
                "You have exceeded the {} budget by ${:.2} ({:.1}%)",
                usage.category,
                usage.overage(),
                usage.percent
            ),
        ),
        BudgetStatus::NearLimit => NewAlert::new(
            user_id,
            AlertKind::BudgetNearLimit,
            Severity::Medium,
            format!(
                "You are close to the {} limit: ${:.2} of ${:.2} ({:.1}%)",
                usage.category, usage.spent, usage.limit, usage.percent
            ),
        ),
        BudgetStatus::Ok => return None,
    };

    Some(
        alert
            .with_category(usage.category.clone())
            .with_amount(usage.spent)
            .with_limit(usage.limit),
    )
}

/// Budget alerts using the default thresholds
pub fn check_budgets(transactions: &[Transaction], budgets: &[Budget], user_id: &str) -> Vec<NewAlert> {
    AlertEngine::new().check_budgets(transactions, budgets, user_id)
}

/// Unusual-expense alerts using the default `k`
pub fn check_unusual_patterns(transactions: &[Transaction]) -> Vec<NewAlert> {
    AlertEngine::new().check_unusual_patterns(transactions)
}
