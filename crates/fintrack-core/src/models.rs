//! Data models for fintrack

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a monetary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction type: {}", s)),
        }
    }
}

/// A single dated monetary movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    /// Always positive; direction comes from `tx_type`
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl Transaction {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        tx_type: TransactionType,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            amount,
            category: category.into(),
            description: description.into(),
            date,
            tx_type,
            account: None,
        }
    }

    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.tx_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.tx_type == TransactionType::Income
    }
}

/// Budget period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetPeriod {
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(format!("Unknown budget period: {}", s)),
        }
    }
}

/// A per-category spending ceiling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub user_id: String,
    pub category: String,
    pub max_amount: f64,
    #[serde(default)]
    pub period: BudgetPeriod,
}

impl Budget {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        category: impl Into<String>,
        max_amount: f64,
        period: BudgetPeriod,
    ) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            category: category.into(),
            max_amount,
            period,
        }
    }
}

/// Kinds of alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// Spending in a category went over its budget
    BudgetExceeded,
    /// Spending in a category is close to its budget
    BudgetNearLimit,
    /// A single expense far above the usual amount
    UnusualExpense,
    Reminder,
    Suggestion,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BudgetExceeded => "budget_exceeded",
            Self::BudgetNearLimit => "budget_near_limit",
            Self::UnusualExpense => "unusual_expense",
            Self::Reminder => "reminder",
            Self::Suggestion => "suggestion",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::BudgetExceeded => "Budget Exceeded",
            Self::BudgetNearLimit => "Budget Near Limit",
            Self::UnusualExpense => "Unusual Expense",
            Self::Reminder => "Reminder",
            Self::Suggestion => "Suggestion",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_exceeded" => Ok(Self::BudgetExceeded),
            "budget_near_limit" => Ok(Self::BudgetNearLimit),
            "unusual_expense" => Ok(Self::UnusualExpense),
            "reminder" => Ok(Self::Reminder),
            "suggestion" => Ok(Self::Suggestion),
            _ => Err(format!("Unknown alert kind: {}", s)),
        }
    }
}

/// Severity level of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// An alert produced by the rule engine (before it is assigned an id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub user_id: String,
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    /// Category the alert refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Amount spent in the category, or the flagged expense amount
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    /// Budget ceiling, for budget alerts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<f64>,
}

impl NewAlert {
    pub fn new(
        user_id: impl Into<String>,
        kind: AlertKind,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            kind,
            severity,
            message: message.into(),
            category: None,
            amount: None,
            limit: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_limit(mut self, limit: f64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Assign an id, producing an unread alert
    pub fn into_alert(self, id: impl Into<String>) -> Alert {
        Alert {
            id: id.into(),
            user_id: self.user_id,
            kind: self.kind,
            message: self.message,
            severity: self.severity,
            read: false,
        }
    }
}

/// A stored alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub user_id: String,
    pub kind: AlertKind,
    pub message: String,
    pub severity: Severity,
    #[serde(default)]
    pub read: bool,
}

impl Alert {
    pub fn mark_read(&mut self) {
        self.read = true;
    }
}

/// Subscription plan of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Plan {
    #[default]
    Basic,
    Premium,
    Enterprise,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Premium => "premium",
            Self::Enterprise => "enterprise",
        }
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(Self::Basic),
            "premium" => Ok(Self::Premium),
            "enterprise" => Ok(Self::Enterprise),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub plan: Plan,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_string_forms() {
        assert_eq!(TransactionType::Expense.as_str(), "expense");
        assert_eq!(
            TransactionType::from_str("income").unwrap(),
            TransactionType::Income
        );
        assert!(TransactionType::from_str("gift").is_err());
        assert_eq!(
            AlertKind::from_str("budget_near_limit").unwrap(),
            AlertKind::BudgetNearLimit
        );
        assert_eq!(BudgetPeriod::from_str("weekly").unwrap(), BudgetPeriod::Weekly);
        assert_eq!(Plan::default(), Plan::Basic);
    }

    #[test]
    fn test_severity_priority() {
        assert!(Severity::High.priority() > Severity::Medium.priority());
        assert!(Severity::Medium.priority() > Severity::Low.priority());
    }

    #[test]
    fn test_transaction_serializes_type_field() {
        let tx = Transaction::new(
            "t1",
            "u1",
            12.5,
            "Food",
            "Groceries",
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            TransactionType::Expense,
        );
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["type"], "expense");
        assert_eq!(json["date"], "2024-01-15");
        assert!(json.get("account").is_none());
    }

    #[test]
    fn test_new_alert_into_alert_is_unread() {
        let mut alert = NewAlert::new("u1", AlertKind::Reminder, Severity::Low, "Pay rent")
            .with_category("Housing")
            .into_alert("a1");
        assert_eq!(alert.id, "a1");
        assert!(!alert.read);
        alert.mark_read();
        assert!(alert.read);
        assert_eq!(alert.kind, AlertKind::Reminder);
    }
}
