//! Export command implementation

use std::path::Path;

use anyhow::{Context, Result};
use fintrack_core::export;

use super::Snapshot;

pub fn cmd_export(snapshot: &Snapshot, output: &Path) -> Result<()> {
    let format = export::export_to_path(output, &snapshot.transactions)
        .with_context(|| format!("Failed to export to {}", output.display()))?;

    println!(
        "📤 Exported {} transactions to {} ({})",
        snapshot.transactions.len(),
        output.display(),
        format
    );
    if snapshot.rejected > 0 {
        println!("   {} invalid row(s) were left out", snapshot.rejected);
    }

    Ok(())
}
