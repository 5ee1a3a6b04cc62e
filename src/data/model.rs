use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Dimension – one of the three filterable categorical columns
// ---------------------------------------------------------------------------

/// Categorical columns the side panel filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Branch,
    ProductLine,
    CustomerType,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [
        Dimension::Branch,
        Dimension::ProductLine,
        Dimension::CustomerType,
    ];

    /// Header of the source column.
    pub fn column(self) -> &'static str {
        match self {
            Dimension::Branch => "Branch",
            Dimension::ProductLine => "Product line",
            Dimension::CustomerType => "Customer type",
        }
    }

    pub fn value_of(self, tx: &Transaction) -> &str {
        match self {
            Dimension::Branch => &tx.branch,
            Dimension::ProductLine => &tx.product_line,
            Dimension::CustomerType => &tx.customer_type,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// NumericField – the seven numeric columns, in correlation-matrix order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericField {
    UnitPrice,
    Quantity,
    Tax,
    Total,
    Cogs,
    GrossIncome,
    Rating,
}

impl NumericField {
    pub const ALL: [NumericField; 7] = [
        NumericField::UnitPrice,
        NumericField::Quantity,
        NumericField::Tax,
        NumericField::Total,
        NumericField::Cogs,
        NumericField::GrossIncome,
        NumericField::Rating,
    ];

    pub fn column(self) -> &'static str {
        match self {
            NumericField::UnitPrice => "Unit price",
            NumericField::Quantity => "Quantity",
            NumericField::Tax => "Tax 5%",
            NumericField::Total => "Total",
            NumericField::Cogs => "cogs",
            NumericField::GrossIncome => "gross income",
            NumericField::Rating => "Rating",
        }
    }

    pub fn value_of(self, tx: &Transaction) -> f64 {
        match self {
            NumericField::UnitPrice => tx.unit_price,
            NumericField::Quantity => tx.quantity as f64,
            NumericField::Tax => tx.tax,
            NumericField::Total => tx.total,
            NumericField::Cogs => tx.cogs,
            NumericField::GrossIncome => tx.gross_income,
            NumericField::Rating => tx.rating,
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

// ---------------------------------------------------------------------------
// Transaction – one row of the source table
// ---------------------------------------------------------------------------

/// A single sale. Derived columns (`total`, `gross_income`) are kept exactly
/// as read; nothing here checks `total == cogs + tax`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub date: NaiveDate,
    pub branch: String,
    pub product_line: String,
    pub customer_type: String,
    pub payment: String,
    pub unit_price: f64,
    pub quantity: u32,
    pub tax: f64,
    pub total: f64,
    pub cogs: f64,
    pub gross_income: f64,
    pub rating: f64,
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed dataset with the filter option lists pre-computed.
#[derive(Debug, Clone, Default)]
pub struct SalesDataset {
    /// All transactions, in file order.
    pub transactions: Vec<Transaction>,
    /// For each filter dimension the sorted set of values seen in the file.
    pub options: BTreeMap<Dimension, BTreeSet<String>>,
}

impl SalesDataset {
    /// Build option lists from the loaded transactions.
    pub fn from_transactions(transactions: Vec<Transaction>) -> Self {
        let mut options: BTreeMap<Dimension, BTreeSet<String>> = Dimension::ALL
            .iter()
            .map(|&dim| (dim, BTreeSet::new()))
            .collect();

        for tx in &transactions {
            for dim in Dimension::ALL {
                options
                    .entry(dim)
                    .or_default()
                    .insert(dim.value_of(tx).to_string());
            }
        }

        SalesDataset {
            transactions,
            options,
        }
    }

    /// Distinct values of `dim` across the whole file.
    pub fn options(&self, dim: Dimension) -> &BTreeSet<String> {
        static EMPTY: BTreeSet<String> = BTreeSet::new();
        self.options.get(&dim).unwrap_or(&EMPTY)
    }

    /// Number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a transaction with `total = cogs * 1.05` and a 5% margin.
    pub(crate) fn tx(
        date: (i32, u32, u32),
        branch: &str,
        product_line: &str,
        customer_type: &str,
        payment: &str,
        cogs: f64,
        rating: f64,
    ) -> Transaction {
        let tax = cogs * 0.05;
        Transaction {
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            branch: branch.to_string(),
            product_line: product_line.to_string(),
            customer_type: customer_type.to_string(),
            payment: payment.to_string(),
            unit_price: cogs / 2.0,
            quantity: 2,
            tax,
            total: cogs + tax,
            cogs,
            gross_income: tax,
            rating,
        }
    }

    pub(crate) fn sample_dataset() -> SalesDataset {
        SalesDataset::from_transactions(vec![
            tx((2019, 1, 5), "A", "Health and beauty", "Member", "Ewallet", 500.0, 9.1),
            tx((2019, 1, 5), "C", "Electronic accessories", "Normal", "Cash", 76.4, 9.6),
            tx((2019, 3, 3), "A", "Home and lifestyle", "Normal", "Credit card", 324.3, 7.4),
            tx((2019, 1, 27), "A", "Health and beauty", "Member", "Ewallet", 465.8, 8.4),
            tx((2019, 2, 8), "B", "Sports and travel", "Normal", "Ewallet", 604.2, 5.3),
            tx((2019, 3, 25), "C", "Electronic accessories", "Normal", "Ewallet", 597.7, 4.1),
            tx((2019, 2, 25), "B", "Electronic accessories", "Member", "Cash", 413.0, 5.8),
            tx((2019, 1, 27), "B", "Home and lifestyle", "Member", "Credit card", 735.6, 8.0),
        ])
    }

    #[test]
    fn options_are_sorted_and_distinct() {
        let ds = sample_dataset();
        let branches: Vec<&str> = ds.options(Dimension::Branch).iter().map(String::as_str).collect();
        assert_eq!(branches, vec!["A", "B", "C"]);
        assert_eq!(ds.options(Dimension::ProductLine).len(), 4);
        assert_eq!(ds.options(Dimension::CustomerType).len(), 2);
    }

    #[test]
    fn empty_dataset_has_empty_options() {
        let ds = SalesDataset::from_transactions(Vec::new());
        assert!(ds.is_empty());
        for dim in Dimension::ALL {
            assert!(ds.options(dim).is_empty());
        }
    }

    #[test]
    fn numeric_fields_read_their_columns() {
        let t = tx((2019, 1, 1), "A", "x", "Member", "Cash", 100.0, 7.0);
        assert_eq!(NumericField::Quantity.value_of(&t), 2.0);
        assert_eq!(NumericField::Cogs.value_of(&t), 100.0);
        assert!((NumericField::Total.value_of(&t) - 105.0).abs() < 1e-9);
        assert_eq!(NumericField::ALL[2].column(), "Tax 5%");
    }
}
