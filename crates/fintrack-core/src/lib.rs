//! Fintrack Core Library
//!
//! Analysis and alerting for personal finance snapshots:
//! - Input validation for transactions and users
//! - Category aggregation, outlier detection and spending trends
//! - Budget and unusual-expense alert rules
//! - Financial advisor with recommendations and projections
//! - Paginated report composition (Markdown / JSON)
//! - CSV and JSON snapshot import/export
//! - Optional recommendation webhook client

pub mod advisor;
pub mod alerts;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod export;
pub mod import;
pub mod models;
pub mod report;
pub mod validate;
pub mod webhook;

/// Test utilities including mock recommendation webhook
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advisor::{AnalysisResult, FinancialAdvisor, FinancialSummary, Projections};
pub use alerts::{AlertEngine, BudgetStatus, BudgetUsage, NearLimitCutoff};
pub use analyzer::{CategoryTotal, Trend, TrendDirection, TransactionSummary};
pub use config::{AdvisorConfig, Config, WebhookConfig};
pub use error::{Error, Result};
pub use import::{FileFormat, ImportReport, RejectedRow};
pub use models::*;
pub use report::{ChartData, MonthlyReport, ReportComposer, ReportDocument};
pub use validate::ValidationReport;
pub use webhook::{RecommendationClient, RecommendationSource, Recommendations};
