//! Boundary validation for user-entered records
//!
//! Checks never fail fast: every violated rule is reported so a caller can
//! show all problems at once.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::TransactionType;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("email pattern is valid")
    })
}

/// Outcome of validating a composite record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

pub fn validate_amount(amount: f64) -> bool {
    amount > 0.0
}

/// True if `text` is an ISO calendar date (`YYYY-MM-DD`)
pub fn validate_date(text: &str) -> bool {
    NaiveDate::parse_from_str(text, DATE_FORMAT).is_ok()
}

pub fn validate_email(text: &str) -> bool {
    email_regex().is_match(text)
}

/// Validate the fields of a transaction before it is stored or analyzed
pub fn validate_transaction(
    amount: f64,
    category: &str,
    description: &str,
    date: &str,
    tx_type: &str,
) -> ValidationReport {
    let mut errors = Vec::new();

    if !validate_amount(amount) {
        errors.push("Amount must be greater than 0".to_string());
    }

    if category.chars().count() < 2 {
        errors.push("Invalid category".to_string());
    }

    if description.chars().count() < 3 {
        errors.push("Description too short (minimum 3 characters)".to_string());
    }

    if !validate_date(date) {
        errors.push("Invalid date (format: YYYY-MM-DD)".to_string());
    }

    if tx_type.parse::<TransactionType>().is_err() {
        errors.push("Type must be 'income' or 'expense'".to_string());
    }

    ValidationReport::from_errors(errors)
}

/// Validate the fields of a user account
pub fn validate_user(email: &str, name: &str) -> ValidationReport {
    let mut errors = Vec::new();

    if email.chars().count() < 5 {
        errors.push("Email missing or too short".to_string());
    } else if !validate_email(email) {
        errors.push("Invalid email format".to_string());
    }

    if name.chars().count() < 2 {
        errors.push("Name missing or too short".to_string());
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0.01));
        assert!(!validate_amount(0.0));
        assert!(!validate_amount(-5.0));
        assert!(!validate_amount(f64::NAN));
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2024-01-15"));
        assert!(validate_date("2024-02-29"));
        assert!(!validate_date("2023-02-29"));
        assert!(!validate_date("15/01/2024"));
        assert!(!validate_date(""));
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana.perez+bills@example.co"));
        assert!(validate_email("a_b%c-d@mail.example.org"));
        assert!(!validate_email("no-at-sign.example.com"));
        assert!(!validate_email("user@domain"));
        assert!(!validate_email("user@domain.c"));
        assert!(!validate_email("user name@example.com"));
    }

    #[test]
    fn test_negative_amount_is_the_only_error() {
        let report = validate_transaction(-5.0, "Food", "lunch", "2024-01-15", "expense");
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["Amount must be greater than 0"]);
    }

    #[test]
    fn test_all_errors_accumulate_in_order() {
        let report = validate_transaction(0.0, "F", "ab", "2024-13-01", "gift");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 5);
        assert!(report.errors[0].starts_with("Amount"));
        assert_eq!(report.errors[1], "Invalid category");
        assert!(report.errors[2].starts_with("Description"));
        assert!(report.errors[3].starts_with("Invalid date"));
        assert!(report.errors[4].starts_with("Type"));
    }

    #[test]
    fn test_valid_transaction() {
        let report = validate_transaction(42.0, "Rent", "April rent", "2024-04-01", "expense");
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_lengths_count_characters() {
        // Two characters, four bytes
        let report = validate_transaction(1.0, "ñé", "café", "2024-04-01", "income");
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_validate_user() {
        assert!(validate_user("ana@example.com", "Ana").valid);

        let short = validate_user("a@b", "A");
        assert_eq!(
            short.errors,
            vec!["Email missing or too short", "Name missing or too short"]
        );

        let malformed = validate_user("not-an-email", "Ana");
        assert_eq!(malformed.errors, vec!["Invalid email format"]);
    }
}
