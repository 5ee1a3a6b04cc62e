use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;

use super::model::{Dimension, SalesDataset, Transaction};

/// Columns the dashboard reads. Any other column in the file is ignored.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Date",
    "Branch",
    "Product line",
    "Customer type",
    "Payment",
    "Unit price",
    "Quantity",
    "Tax 5%",
    "Total",
    "cogs",
    "gross income",
    "Rating",
];

/// Date-only layouts, month-first before day-first.
const DATE_FORMATS: [&str; 4] = ["%m/%d/%Y", "%Y-%m-%d", "%Y/%m/%d", "%m-%d-%Y"];

/// Timestamp layouts; the time part is dropped.
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),
    #[error("missing required column '{0}'")]
    MissingColumn(String),
    #[error("row {row}: cannot parse date '{value}'")]
    BadDate { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a sales dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with the [`REQUIRED_COLUMNS`]
/// * `.json` – `[{ "Date": "1/5/2019", "Branch": "A", ... }, ...]`
///
/// Any failure aborts the whole load; there is no partial dataset.
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        other => Err(LoadError::UnsupportedExtension(other.to_string()).into()),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} transactions from {} ({} branches, {} product lines, {} customer types)",
        dataset.len(),
        path.display(),
        dataset.options(Dimension::Branch).len(),
        dataset.options(Dimension::ProductLine).len(),
        dataset.options(Dimension::CustomerType).len(),
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Row layout shared by the CSV and JSON readers
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawTransaction {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Branch")]
    branch: String,
    #[serde(rename = "Product line")]
    product_line: String,
    #[serde(rename = "Customer type")]
    customer_type: String,
    #[serde(rename = "Payment")]
    payment: String,
    #[serde(rename = "Unit price")]
    unit_price: f64,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Tax 5%")]
    tax: f64,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "cogs")]
    cogs: f64,
    #[serde(rename = "gross income")]
    gross_income: f64,
    #[serde(rename = "Rating")]
    rating: f64,
}

impl RawTransaction {
    fn into_transaction(self, row: usize) -> Result<Transaction, LoadError> {
        let date = parse_date(&self.date).ok_or_else(|| LoadError::BadDate {
            row,
            value: self.date.clone(),
        })?;
        Ok(Transaction {
            date,
            branch: self.branch,
            product_line: self.product_line,
            customer_type: self.customer_type,
            payment: self.payment,
            unit_price: self.unit_price,
            quantity: self.quantity,
            tax: self.tax,
            total: self.total,
            cogs: self.cogs,
            gross_income: self.gross_income,
            rating: self.rating,
        })
    }
}

/// Parse a date cell into a calendar date, trying each known layout.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<SalesDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .context("opening CSV")?;

    let headers = reader.headers().context("reading CSV headers")?.clone();
    for col in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == col) {
            return Err(LoadError::MissingColumn(col.to_string()).into());
        }
    }

    let mut transactions = Vec::new();
    // Rows are numbered from 1, counting data rows only.
    for (row, result) in (1..).zip(reader.deserialize::<RawTransaction>()) {
        let raw = result.with_context(|| format!("CSV row {row}"))?;
        transactions.push(raw.into_transaction(row)?);
    }

    Ok(SalesDataset::from_transactions(transactions))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')` with
/// dates written as text.
fn load_json(path: &Path) -> Result<SalesDataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<RawTransaction> = serde_json::from_str(&text).context("parsing JSON")?;

    let transactions = records
        .into_iter()
        .zip(1..)
        .map(|(raw, row)| raw.into_transaction(row))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SalesDataset::from_transactions(transactions))
}
