//! Transaction export to CSV or JSON
//!
//! CSV columns match the import headers, so an exported file loads back
//! unchanged.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::import::FileFormat;
use crate::models::Transaction;

/// Flat CSV row; `account` is always present so every row has the same width
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    user_id: &'a str,
    date: String,
    #[serde(rename = "type")]
    tx_type: &'static str,
    category: &'a str,
    description: &'a str,
    amount: String,
    account: &'a str,
}

impl<'a> From<&'a Transaction> for CsvRow<'a> {
    fn from(tx: &'a Transaction) -> Self {
        Self {
            id: &tx.id,
            user_id: &tx.user_id,
            date: tx.date.to_string(),
            tx_type: tx.tx_type.as_str(),
            category: &tx.category,
            description: &tx.description,
            amount: format!("{:.2}", tx.amount),
            account: tx.account.as_deref().unwrap_or(""),
        }
    }
}

/// Write transactions as CSV with a header row
pub fn write_transactions_csv<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for tx in transactions {
        wtr.serialize(CsvRow::from(tx))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write transactions as a pretty-printed JSON array
pub fn write_transactions_json<W: Write>(writer: W, transactions: &[Transaction]) -> Result<()> {
    serde_json::to_writer_pretty(writer, transactions)?;
    Ok(())
}

/// Export transactions to a string in the given format
pub fn export_transactions(transactions: &[Transaction], format: FileFormat) -> Result<String> {
    let mut buf = Vec::new();
    match format {
        FileFormat::Csv => write_transactions_csv(&mut buf, transactions)?,
        FileFormat::Json => write_transactions_json(&mut buf, transactions)?,
    }
    String::from_utf8(buf).map_err(|e| Error::InvalidData(format!("Export is not UTF-8: {}", e)))
}

/// Export transactions to a file; the format follows the extension
pub fn export_to_path(path: &Path, transactions: &[Transaction]) -> Result<FileFormat> {
    let format = FileFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        FileFormat::Csv => write_transactions_csv(&mut writer, transactions)?,
        FileFormat::Json => write_transactions_json(&mut writer, transactions)?,
    }
    writer.flush()?;

    debug!(path = %path.display(), count = transactions.len(), %format, "Exported transactions");
    Ok(format)
}
