//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Shared utilities (config and snapshot loading, user resolution)
//! - `analysis` - Validate, summary, analyze, alerts, trend and outlier commands
//! - `reports` - Full and monthly report commands
//! - `export` - Transaction export command
//! - `recommend` - Recommendation webhook command

pub mod analysis;
pub mod core;
pub mod export;
pub mod recommend;
pub mod reports;

// Re-export command functions for main.rs
pub use analysis::*;
pub use core::*;
pub use export::*;
pub use recommend::*;
pub use reports::*;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
