//! Financial advisor
//!
//! Turns a user's transaction and budget snapshot into a summary, plain
//! language recommendations, budget alert lines and simple projections.
//! Recomputed from scratch on every call; nothing is cached.

use serde::{Deserialize, Serialize};

use crate::alerts::{self, BudgetStatus, NearLimitCutoff};
use crate::analyzer;
use crate::config::AdvisorConfig;
use crate::models::{Budget, Transaction};

/// Income, expense and savings for the snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialSummary {
    pub total_income: f64,
    pub total_expense: f64,
    pub net_savings: f64,
    /// Net savings as a percentage of income (0 without income)
    pub savings_rate: f64,
}

/// Linear projections based on fixed growth factors
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projections {
    pub savings_3mo: f64,
    pub next_month_expense: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: FinancialSummary,
    pub recommendations: Vec<String>,
    pub alerts: Vec<String>,
    pub projections: Projections,
}

pub const INSUFFICIENT_DATA: &str = "Not enough data to generate recommendations";
pub const KEEP_TRACKING: &str = "Keep logging your transactions for better analysis";

pub struct FinancialAdvisor {
    config: AdvisorConfig,
}

impl Default for FinancialAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

impl FinancialAdvisor {
    pub fn new() -> Self {
        Self {
            config: AdvisorConfig::default(),
        }
    }

    pub fn with_config(config: AdvisorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    /// Analyze one user's snapshot
    pub fn analyze(&self, transactions: &[Transaction], budgets: &[Budget]) -> AnalysisResult {
        if transactions.is_empty() {
            return AnalysisResult {
                recommendations: vec![INSUFFICIENT_DATA.to_string()],
                ..AnalysisResult::default()
            };
        }

        let expenses = analyzer::expenses_by_category(transactions);
        let total_expense: f64 = expenses.iter().map(|c| c.amount).sum();
        let total_income = analyzer::total_income(transactions);
        let net_savings = total_income - total_expense;
        let savings_rate = if total_income > 0.0 {
            net_savings / total_income * 100.0
        } else {
            0.0
        };

        let mut recommendations = Vec::new();
        let mut alert_lines = Vec::new();

        // One line per category, flagged only strictly above the cutoff
        let budgets = alerts::dedupe_categories(budgets);
        let near_limit = NearLimitCutoff::Above(self.config.advisor_near_limit_percent);
        for usage in alerts::evaluate_budgets(&expenses, &budgets, near_limit) {
            match usage.status {
                BudgetStatus::Exceeded => alert_lines.push(format!(
                    "Budget exceeded for {}! ({:.1}%)",
                    usage.category, usage.percent
                )),
                BudgetStatus::NearLimit => alert_lines.push(format!(
                    "Spending in {} at {:.1}% of budget",
                    usage.category, usage.percent
                )),
                BudgetStatus::Ok => {}
            }
        }

        if total_income > 0.0 {
            if savings_rate < self.config.low_savings_rate {
                recommendations.push(format!(
                    "Consider raising your savings rate to at least {:.0}% of your income",
                    self.config.low_savings_rate
                ));
            } else if savings_rate > self.config.high_savings_rate {
                recommendations.push(format!(
                    "Excellent! You are saving more than {:.0}% of your income",
                    self.config.high_savings_rate
                ));
            }
        }

        if let Some(top) = analyzer::top_category(&expenses) {
            recommendations.push(format!(
                "Your biggest expense is {}. Review whether you can optimize it",
                top.category
            ));
        }

        if recommendations.is_empty() {
            recommendations.push(KEEP_TRACKING.to_string());
        }

        let projections = Projections {
            savings_3mo: net_savings
                * f64::from(self.config.projection_months)
                * self.config.savings_growth,
            next_month_expense: total_expense * self.config.expense_growth,
        };

        tracing::debug!(
            transactions = transactions.len(),
            budgets = budgets.len(),
            alerts = alert_lines.len(),
            "Analysis complete"
        );

        AnalysisResult {
            summary: FinancialSummary {
                total_income,
                total_expense,
                net_savings,
                savings_rate,
            },
            recommendations,
            alerts: alert_lines,
            projections,
        }
    }
}

/// Analyze with the default configuration
pub fn analyze(transactions: &[Transaction], budgets: &[Budget]) -> AnalysisResult {
    FinancialAdvisor::new().analyze(transactions, budgets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BudgetPeriod, TransactionType};
    use chrono::NaiveDate;

    fn tx(id: &str, amount: f64, category: &str, tx_type: TransactionType) -> Transaction {
        Transaction::new(
            id,
            "u1",
            amount,
            category,
            "Test entry",
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap(),
            tx_type,
        )
    }

    fn budget(category: &str, max: f64) -> Budget {
        Budget::new(format!("b-{}", category), "u1", category, max, BudgetPeriod::Monthly)
    }

    #[test]
    fn test_empty_snapshot() {
        let result = analyze(&[], &[budget("Food", 100.0)]);
        assert_eq!(result.summary, FinancialSummary::default());
        assert_eq!(result.recommendations, vec![INSUFFICIENT_DATA]);
        assert!(result.alerts.is_empty());
        assert_eq!(result.projections, Projections::default());
    }

    #[test]
    fn test_summary_and_projections() {
        let txs = vec![
            tx("i1", 1000.0, "Salary", TransactionType::Income),
            tx("e1", 500.0, "Rent", TransactionType::Expense),
            tx("e2", 200.0, "Food", TransactionType::Expense),
        ];
        let result = analyze(&txs, &[]);

        assert_eq!(result.summary.total_income, 1000.0);
        assert_eq!(result.summary.total_expense, 700.0);
        assert_eq!(result.summary.net_savings, 300.0);
        assert_eq!(result.summary.savings_rate, 30.0);
        assert!((result.projections.savings_3mo - 945.0).abs() < 1e-9);
        assert!((result.projections.next_month_expense - 714.0).abs() < 1e-9);
        // 30% is neither low nor above the congratulatory threshold
        assert_eq!(
            result.recommendations,
            vec!["Your biggest expense is Rent. Review whether you can optimize it"]
        );
    }

    #[test]
    fn test_net_savings_identity() {
        let txs = vec![
            tx("i1", 0.3, "Salary", TransactionType::Income),
            tx("e1", 0.1, "Food", TransactionType::Expense),
            tx("e2", 0.2, "Food", TransactionType::Expense),
        ];
        let result = analyze(&txs, &[]);
        let s = &result.summary;
        assert_eq!(s.net_savings, s.total_income - s.total_expense);
    }

    #[test]
    fn test_savings_rate_recommendations() {
        let low = analyze(
            &[
                tx("i1", 1000.0, "Salary", TransactionType::Income),
                tx("e1", 950.0, "Rent", TransactionType::Expense),
            ],
            &[],
        );
        assert!(low.recommendations[0].contains("at least 10%"));

        let high = analyze(
            &[
                tx("i1", 1000.0, "Salary", TransactionType::Income),
                tx("e1", 100.0, "Rent", TransactionType::Expense),
            ],
            &[],
        );
        assert!(high.recommendations[0].starts_with("Excellent!"));
        assert_eq!(high.recommendations.len(), 2);
    }

    #[test]
    fn test_no_income_means_zero_rate() {
        let result = analyze(&[tx("e1", 50.0, "Food", TransactionType::Expense)], &[]);
        assert_eq!(result.summary.savings_rate, 0.0);
        assert_eq!(result.summary.net_savings, -50.0);
        assert_eq!(result.recommendations.len(), 1);
    }

    #[test]
    fn test_exceeded_takes_priority_over_near_limit() {
        let txs = vec![
            tx("e1", 150.0, "Food", TransactionType::Expense),
            tx("e2", 95.0, "Transport", TransactionType::Expense),
            tx("e3", 10.0, "Health", TransactionType::Expense),
        ];
        let budgets = vec![
            budget("Food", 100.0),
            budget("Transport", 100.0),
            budget("Health", 100.0),
        ];

        let result = analyze(&txs, &budgets);
        assert_eq!(
            result.alerts,
            vec![
                "Budget exceeded for Food! (150.0%)".to_string(),
                "Spending in Transport at 95.0% of budget".to_string(),
            ]
        );
    }

    #[test]
    fn test_advisor_near_limit_threshold_is_higher_than_rule_engine() {
        let txs = vec![tx("e1", 85.0, "Food", TransactionType::Expense)];
        let result = analyze(&txs, &[budget("Food", 100.0)]);
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn test_exactly_at_advisor_threshold_is_not_flagged() {
        let at_90 = analyze(
            &[tx("e1", 90.0, "Food", TransactionType::Expense)],
            &[budget("Food", 100.0)],
        );
        assert!(at_90.alerts.is_empty());

        let above_90 = analyze(
            &[tx("e1", 90.5, "Food", TransactionType::Expense)],
            &[budget("Food", 100.0)],
        );
        assert_eq!(above_90.alerts, vec!["Spending in Food at 90.5% of budget"]);
    }

    #[test]
    fn test_budgets_from_several_users_give_one_line_per_category() {
        let txs = vec![tx("e1", 150.0, "Food", TransactionType::Expense)];
        let other = Budget::new("b-other", "u2", "Food", 100.0, BudgetPeriod::Monthly);

        let result = analyze(&txs, &[budget("Food", 100.0), other]);
        assert_eq!(result.alerts, vec!["Budget exceeded for Food! (150.0%)"]);
    }

    #[test]
    fn test_custom_growth_factors() {
        let config = AdvisorConfig {
            savings_growth: 1.10,
            expense_growth: 1.05,
            ..AdvisorConfig::default()
        };
        let advisor = FinancialAdvisor::with_config(config);
        let result = advisor.analyze(
            &[
                tx("i1", 200.0, "Salary", TransactionType::Income),
                tx("e1", 100.0, "Food", TransactionType::Expense),
            ],
            &[],
        );
        assert!((result.projections.savings_3mo - 330.0).abs() < 1e-9);
        assert!((result.projections.next_month_expense - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_analyze_is_idempotent() {
        let txs = vec![
            tx("i1", 1000.0, "Salary", TransactionType::Income),
            tx("e1", 120.0, "Food", TransactionType::Expense),
        ];
        let budgets = vec![budget("Food", 100.0)];

        let first = serde_json::to_string(&analyze(&txs, &budgets)).unwrap();
        let second = serde_json::to_string(&analyze(&txs, &budgets)).unwrap();
        assert_eq!(first, second);
    }
}
