//! Shared utilities for commands
//!
//! This module contains:
//! - `load_config` - Resolve config file and environment overrides
//! - `load_snapshot` - Read and validate transactions and budgets
//! - `resolve_user` - Pick the user a single-user command runs for
//! - `user_snapshot` - Resolve that user and keep only their rows

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::{import, Budget, Config, Transaction};

use crate::cli::SnapshotArgs;

/// Load config from an explicit path or the default location
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    Ok(config.with_env_overrides())
}

/// Validated transactions and budgets, optionally narrowed to one user
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub budgets: Vec<Budget>,
    /// Number of transaction rows dropped by validation
    pub rejected: usize,
    pub user: Option<String>,
}

impl Snapshot {
    /// Distinct user ids in first-seen order
    pub fn users(&self) -> Vec<String> {
        let mut users: Vec<String> = Vec::new();
        for tx in &self.transactions {
            if !users.contains(&tx.user_id) {
                users.push(tx.user_id.clone());
            }
        }
        users
    }

    /// Only `user`'s transactions and budgets
    pub fn for_user(&self, user: &str) -> Snapshot {
        Snapshot {
            transactions: self
                .transactions
                .iter()
                .filter(|t| t.user_id == user)
                .cloned()
                .collect(),
            budgets: self
                .budgets
                .iter()
                .filter(|b| b.user_id == user)
                .cloned()
                .collect(),
            rejected: self.rejected,
            user: Some(user.to_string()),
        }
    }
}

pub fn load_snapshot(args: &SnapshotArgs) -> Result<Snapshot> {
    read_snapshot(&args.transactions, args.budgets.as_deref(), args.user.as_deref())
}

pub fn read_snapshot(
    transactions: &Path,
    budgets: Option<&Path>,
    user: Option<&str>,
) -> Result<Snapshot> {
    let report = import::load_transactions(transactions)
        .with_context(|| format!("Failed to read transactions from {}", transactions.display()))?;

    if !report.is_clean() {
        println!(
            "⚠️  Skipped {} invalid row(s) in {} (run `fintrack validate transactions` for details)",
            report.rejected.len(),
            transactions.display()
        );
    }

    let budgets = match budgets {
        Some(path) => import::load_budgets(path)
            .with_context(|| format!("Failed to read budgets from {}", path.display()))?,
        None => Vec::new(),
    };

    let (transactions, budgets) = match user {
        Some(user) => (
            report
                .transactions
                .into_iter()
                .filter(|t| t.user_id == user)
                .collect(),
            budgets.into_iter().filter(|b| b.user_id == user).collect(),
        ),
        None => (report.transactions, budgets),
    };

    tracing::debug!(
        transactions = transactions.len(),
        budgets = budgets.len(),
        "Snapshot loaded"
    );

    Ok(Snapshot {
        transactions,
        budgets,
        rejected: report.rejected.len(),
        user: user.map(str::to_string),
    })
}

/// The requested user, or the only user in the snapshot
pub fn resolve_user(snapshot: &Snapshot) -> Result<String> {
    if let Some(user) = &snapshot.user {
        return Ok(user.clone());
    }
    let users = snapshot.users();
    match users.as_slice() {
        [only] => Ok(only.clone()),
        [] => anyhow::bail!("No transactions in snapshot; pass --user"),
        _ => anyhow::bail!(
            "Snapshot has {} users ({}); pass --user",
            users.len(),
            users.join(", ")
        ),
    }
}

/// Resolve the user and narrow the snapshot to their transactions and budgets
pub fn user_snapshot(snapshot: &Snapshot) -> Result<(String, Snapshot)> {
    let user = resolve_user(snapshot)?;
    let scoped = snapshot.for_user(&user);
    Ok((user, scoped))
}
