//! Snapshot loading from CSV and JSON
//!
//! Transaction rows are validated at the boundary. Rows that fail validation
//! are reported with their position and never reach the analyzer.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{Budget, Transaction, TransactionType};
use crate::validate::validate_transaction;

/// On-disk snapshot format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Json,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Detect the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        ext.parse().map_err(|_| {
            Error::InvalidData(format!(
                "Unsupported file type for {} (expected .csv or .json)",
                path.display()
            ))
        })
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// A transaction row that failed validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRow {
    /// CSV line number, or 1-based array position for JSON
    pub line: usize,
    pub errors: Vec<String>,
}

/// Result of loading a transaction file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub transactions: Vec<Transaction>,
    pub rejected: Vec<RejectedRow>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn push(&mut self, line: usize, row: &Value) {
        match transaction_from_value(line, row) {
            Ok(tx) => self.transactions.push(tx),
            Err(errors) => {
                warn!(line, errors = ?errors, "Rejected transaction row");
                self.rejected.push(RejectedRow { line, errors });
            }
        }
    }
}

/// Convert a CSV record to a JSON object using headers as keys
fn record_to_value(headers: &StringRecord, record: &StringRecord) -> Value {
    let mut map = Map::new();
    for (i, header) in headers.iter().enumerate() {
        if let Some(value) = record.get(i) {
            map.insert(header.trim().to_string(), Value::String(value.to_string()));
        }
    }
    Value::Object(map)
}

fn field<'a>(row: &'a Value, key: &str) -> &'a str {
    row.get(key).and_then(Value::as_str).unwrap_or("").trim()
}

/// Amount as a finite number; anything else becomes NaN so validation rejects it
fn amount_of(row: &Value) -> f64 {
    let amount = match row.get("amount") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    amount.filter(|a| a.is_finite()).unwrap_or(f64::NAN)
}

fn transaction_from_value(line: usize, row: &Value) -> std::result::Result<Transaction, Vec<String>> {
    if !row.is_object() {
        return Err(vec!["Row is not an object".to_string()]);
    }

    let amount = amount_of(row);
    let category = field(row, "category");
    let description = field(row, "description");
    let date = field(row, "date");
    let tx_type = field(row, "type");

    let mut errors = validate_transaction(amount, category, description, date, tx_type).errors;

    let user_id = field(row, "user_id");
    if user_id.is_empty() {
        errors.push("Missing user_id".to_string());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Both were checked by validate_transaction
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|e| vec![e.to_string()])?;
    let tx_type: TransactionType = tx_type.parse().map_err(|e: String| vec![e])?;

    let id = match field(row, "id") {
        "" => format!("tx-{}", line),
        id => id.to_string(),
    };

    let mut tx = Transaction::new(id, user_id, amount, category, description, date, tx_type);
    let account = field(row, "account");
    if !account.is_empty() {
        tx = tx.with_account(account);
    }
    Ok(tx)
}

/// Parse transactions from CSV with a header row naming the fields
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<ImportReport> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let mut report = ImportReport::default();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(i + 2);
        report.push(line, &record_to_value(&headers, &record));
    }

    debug!(
        accepted = report.transactions.len(),
        rejected = report.rejected.len(),
        "Parsed transaction CSV"
    );
    Ok(report)
}

/// Parse transactions from a JSON array of objects
pub fn parse_transactions_json<R: Read>(reader: R) -> Result<ImportReport> {
    let value: Value = serde_json::from_reader(reader)?;
    let rows = value
        .as_array()
        .ok_or_else(|| Error::InvalidData("Expected a JSON array of transactions".into()))?;

    let mut report = ImportReport::default();
    for (i, row) in rows.iter().enumerate() {
        report.push(i + 1, row);
    }

    debug!(
        accepted = report.transactions.len(),
        rejected = report.rejected.len(),
        "Parsed transaction JSON"
    );
    Ok(report)
}

fn check_budgets(budgets: Vec<Budget>) -> Result<Vec<Budget>> {
    for budget in &budgets {
        if !budget.max_amount.is_finite() || budget.max_amount < 0.0 {
            return Err(Error::InvalidData(format!(
                "Budget {} has a negative or invalid limit: {}",
                budget.id, budget.max_amount
            )));
        }
    }
    Ok(budgets)
}

/// Parse budgets from CSV (`id,user_id,category,max_amount[,period]`)
pub fn parse_budgets_csv<R: Read>(reader: R) -> Result<Vec<Budget>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let budgets = rdr
        .deserialize::<Budget>()
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(count = budgets.len(), "Parsed budget CSV");
    check_budgets(budgets)
}

/// Parse budgets from a JSON array
pub fn parse_budgets_json<R: Read>(reader: R) -> Result<Vec<Budget>> {
    let budgets: Vec<Budget> = serde_json::from_reader(reader)?;
    debug!(count = budgets.len(), "Parsed budget JSON");
    check_budgets(budgets)
}

/// Load transactions from a `.csv` or `.json` file
pub fn load_transactions(path: &Path) -> Result<ImportReport> {
    let format = FileFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        FileFormat::Csv => parse_transactions_csv(reader),
        FileFormat::Json => parse_transactions_json(reader),
    }
}

/// Load budgets from a `.csv` or `.json` file
pub fn load_budgets(path: &Path) -> Result<Vec<Budget>> {
    let format = FileFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    match format {
        FileFormat::Csv => parse_budgets_csv(reader),
        FileFormat::Json => parse_budgets_json(reader),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetPeriod;

    const CSV: &str = "\
id,user_id,amount,category,description,date,type,account
t1,u1,1200.00,Salary,Monthly salary,2024-05-01,income,checking
t2,u1,45.50,Food,Groceries,2024-05-02,expense,
t3,u1,-5,Food,Lunch,2024-05-03,expense,
t4,u1,abc,F,ok,2024-13-01,transfer,
";

    #[test]
    fn test_parse_csv_accepts_valid_rows() {
        let report = parse_transactions_csv(CSV.as_bytes()).unwrap();
        assert_eq!(report.transactions.len(), 2);

        let salary = &report.transactions[0];
        assert_eq!(salary.id, "t1");
        assert_eq!(salary.tx_type, TransactionType::Income);
        assert_eq!(salary.account.as_deref(), Some("checking"));

        let food = &report.transactions[1];
        assert_eq!(food.amount, 45.5);
        assert_eq!(food.account, None);
        assert_eq!(food.date, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[test]
    fn test_parse_csv_reports_rejected_rows() {
        let report = parse_transactions_csv(CSV.as_bytes()).unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.rejected.len(), 2);

        assert_eq!(report.rejected[0].line, 4);
        assert_eq!(report.rejected[0].errors, vec!["Amount must be greater than 0"]);

        let bad = &report.rejected[1];
        assert_eq!(bad.line, 5);
        assert_eq!(bad.errors.len(), 5);
    }

    #[test]
    fn test_parse_csv_rejects_non_finite_amounts() {
        let csv = "\
id,user_id,amount,category,description,date,type
t1,u1,inf,Food,Groceries,2024-05-02,expense
t2,u1,1e400,Food,Groceries,2024-05-02,expense
t3,u1,NaN,Food,Groceries,2024-05-02,expense
t4,u1,12.00,Food,Groceries,2024-05-02,expense
";
        let report = parse_transactions_csv(csv.as_bytes()).unwrap();
        assert_eq!(report.transactions.len(), 1);
        assert_eq!(report.transactions[0].id, "t4");

        let lines: Vec<usize> = report.rejected.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert!(report
            .rejected
            .iter()
            .all(|r| r.errors == vec!["Amount must be greater than 0"]));
    }

    #[test]
    fn test_parse_json() {
        let json = r#"[
            {"id": "a", "user_id": "u1", "amount": 30, "category": "Transport",
             "description": "Bus pass", "date": "2024-05-04", "type": "expense"},
            {"user_id": "u1", "amount": "12.5", "category": "Food",
             "description": "Coffee beans", "date": "2024-05-05", "type": "expense"},
            {"amount": 10, "category": "Food", "description": "Snack",
             "date": "2024-05-05", "type": "expense"},
            "not an object"
        ]"#;

        let report = parse_transactions_json(json.as_bytes()).unwrap();
        assert_eq!(report.transactions.len(), 2);
        assert_eq!(report.transactions[1].id, "tx-2");
        assert_eq!(report.transactions[1].amount, 12.5);

        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].line, 3);
        assert_eq!(report.rejected[0].errors, vec!["Missing user_id"]);
        assert_eq!(report.rejected[1].line, 4);
    }

    #[test]
    fn test_parse_json_requires_array() {
        assert!(parse_transactions_json(r#"{"id": "a"}"#.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_budgets_csv() {
        let csv = "id,user_id,category,max_amount,period\nb1,u1,Food,300,weekly\nb2,u1,Rent,900,monthly\n";
        let budgets = parse_budgets_csv(csv.as_bytes()).unwrap();
        assert_eq!(budgets.len(), 2);
        assert_eq!(budgets[0].period, BudgetPeriod::Weekly);
        assert_eq!(budgets[1].max_amount, 900.0);
    }

    #[test]
    fn test_parse_budgets_rejects_negative_limit() {
        let json = r#"[{"id": "b1", "user_id": "u1", "category": "Food", "max_amount": -1}]"#;
        assert!(parse_budgets_json(json.as_bytes()).is_err());
    }

    #[test]
    fn test_parse_budgets_rejects_infinite_limit() {
        let csv = "id,user_id,category,max_amount\nb1,u1,Food,inf\n";
        assert!(parse_budgets_csv(csv.as_bytes()).is_err());
    }

    #[test]
    fn test_budget_period_defaults_to_monthly() {
        let json = r#"[{"id": "b1", "user_id": "u1", "category": "Food", "max_amount": 100}]"#;
        let budgets = parse_budgets_json(json.as_bytes()).unwrap();
        assert_eq!(budgets[0].period, BudgetPeriod::Monthly);
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tx.csv");
        std::fs::write(&path, CSV).unwrap();

        let report = load_transactions(&path).unwrap();
        assert_eq!(report.transactions.len(), 2);

        let unknown = dir.path().join("tx.xlsx");
        std::fs::write(&unknown, "").unwrap();
        assert!(load_transactions(&unknown).is_err());
    }

    #[test]
    fn test_file_format_detection() {
        assert_eq!(
            FileFormat::from_path(Path::new("a/b/SNAPSHOT.JSON")).unwrap(),
            FileFormat::Json
        );
        assert!(FileFormat::from_path(Path::new("noext")).is_err());
    }
}
