//! Tunable thresholds and heuristics
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/fintrack/config/fintrack.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Missing keys keep their defaults; unknown keys are ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/fintrack.toml");

/// Environment variable overriding the webhook base URL
pub const WEBHOOK_URL_ENV: &str = "FINTRACK_WEBHOOK_URL";

/// Thresholds and growth factors used by the analyzer, alert engine and advisor
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    /// Rule engine near-limit threshold (percent of budget)
    pub alert_near_limit_percent: f64,
    /// Advisor near-limit threshold (percent of budget)
    pub advisor_near_limit_percent: f64,
    /// Savings rate below which a "save more" recommendation is given
    pub low_savings_rate: f64,
    /// Savings rate above which a congratulatory recommendation is given
    pub high_savings_rate: f64,
    pub projection_months: u32,
    pub savings_growth: f64,
    pub expense_growth: f64,
    /// Standard deviations above the mean for an unusual expense
    pub outlier_k: f64,
    pub trend_window_days: u32,
    /// Percent change that separates rising/falling from stable
    pub trend_threshold_percent: f64,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            alert_near_limit_percent: 80.0,
            advisor_near_limit_percent: 90.0,
            low_savings_rate: 10.0,
            high_savings_rate: 30.0,
            projection_months: 3,
            savings_growth: 1.05,
            expense_growth: 1.02,
            outlier_k: 2.0,
            trend_window_days: 30,
            trend_threshold_percent: 10.0,
        }
    }
}

/// Settings for the external recommendation webhook
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookConfig {
    /// Base URL; `None` disables the webhook
    pub base_url: Option<String>,
    pub recommendations_path: String,
    pub timeout: Duration,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            recommendations_path: "financial-recommendations".to_string(),
            timeout: Duration::from_secs(250),
        }
    }
}

/// Complete fintrack configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub advisor: AdvisorConfig,
    pub webhook: WebhookConfig,
}

impl Config {
    /// Load from the default override location, falling back to embedded defaults
    pub fn load() -> Result<Self> {
        load_config(None)
    }

    /// Load from an explicit path, which must exist
    pub fn load_from(path: &Path) -> Result<Self> {
        load_config(Some(path))
    }

    /// Parse config from TOML content
    pub fn from_toml(content: &str) -> Result<Self> {
        parse_config(content)
    }

    /// Apply `FINTRACK_WEBHOOK_URL` if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(WEBHOOK_URL_ENV) {
            if !url.trim().is_empty() {
                self.webhook.base_url = Some(url);
            }
        }
        self
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("fintrack").join("config").join("fintrack.toml"))
}

fn load_config(override_path: Option<&Path>) -> Result<Config> {
    let path = match override_path {
        Some(path) if !path.exists() => {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|p| p.exists()),
    };

    let content = match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading config override");
            fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?
        }
        None => DEFAULT_CONFIG.to_string(),
    };

    parse_config(&content)
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    budgets: Option<RawBudgets>,
    savings: Option<RawSavings>,
    projections: Option<RawProjections>,
    outliers: Option<RawOutliers>,
    trend: Option<RawTrend>,
    webhook: Option<RawWebhook>,
}

#[derive(Debug, Deserialize)]
struct RawBudgets {
    alert_near_limit_percent: Option<f64>,
    advisor_near_limit_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawSavings {
    low_rate_percent: Option<f64>,
    high_rate_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawProjections {
    months: Option<u32>,
    savings_growth: Option<f64>,
    expense_growth: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawOutliers {
    k: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawTrend {
    window_days: Option<u32>,
    threshold_percent: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawWebhook {
    base_url: Option<String>,
    recommendations_path: Option<String>,
    timeout_secs: Option<u64>,
}

fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();
    let advisor = &mut config.advisor;

    if let Some(budgets) = raw.budgets {
        if let Some(v) = budgets.alert_near_limit_percent {
            advisor.alert_near_limit_percent = v;
        }
        if let Some(v) = budgets.advisor_near_limit_percent {
            advisor.advisor_near_limit_percent = v;
        }
    }

    if let Some(savings) = raw.savings {
        if let Some(v) = savings.low_rate_percent {
            advisor.low_savings_rate = v;
        }
        if let Some(v) = savings.high_rate_percent {
            advisor.high_savings_rate = v;
        }
    }

    if let Some(projections) = raw.projections {
        if let Some(v) = projections.months {
            advisor.projection_months = v;
        }
        if let Some(v) = projections.savings_growth {
            advisor.savings_growth = v;
        }
        if let Some(v) = projections.expense_growth {
            advisor.expense_growth = v;
        }
    }

    if let Some(v) = raw.outliers.and_then(|o| o.k) {
        if v < 0.0 {
            return Err(Error::Config(format!("outliers.k must be >= 0, got {}", v)));
        }
        advisor.outlier_k = v;
    }

    if let Some(trend) = raw.trend {
        if let Some(v) = trend.window_days {
            if v < 2 {
                return Err(Error::Config(format!(
                    "trend.window_days must be at least 2, got {}",
                    v
                )));
            }
            advisor.trend_window_days = v;
        }
        if let Some(v) = trend.threshold_percent {
            advisor.trend_threshold_percent = v;
        }
    }

    if let Some(webhook) = raw.webhook {
        if let Some(url) = webhook.base_url.filter(|u| !u.trim().is_empty()) {
            config.webhook.base_url = Some(url);
        }
        if let Some(path) = webhook.recommendations_path {
            config.webhook.recommendations_path = path;
        }
        if let Some(secs) = webhook.timeout_secs {
            config.webhook.timeout = Duration::from_secs(secs);
        }
    }

    Ok(config)
}
