use std::fmt;

use chrono::{DateTime, Utc};

use crate::domain::constants::{PARTITION_KEY, TIME_COLUMN};

/// One price column of a record, e.g. `BTC_USD`
#[derive(Clone, Debug, PartialEq)]
pub struct PriceColumn {
    pub name: String,
    pub value: f64,
}

/// A single lake row: one column per asset/currency pair plus `TIME`
#[derive(Clone, Debug, PartialEq)]
pub struct PriceRecord {
    /// Price columns, ordered by name
    pub columns: Vec<PriceColumn>,

    /// Moment the record was observed (set by the transformer)
    pub time: DateTime<Utc>,
}

impl PriceRecord {
    pub fn new(mut columns: Vec<PriceColumn>, time: DateTime<Utc>) -> Self {
        columns.sort_by(|a, b| a.name.cmp(&b.name));
        Self { columns, time }
    }

    /// Column name for one asset/currency pair
    pub fn column_name(asset: &str, currency: &str) -> String {
        format!("{}_{}", asset, currency)
    }

    /// Every column of the row in storage order, `TIME` last
    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|c| c.name.clone())
            .chain(std::iter::once(TIME_COLUMN.to_string()))
            .collect()
    }

    pub fn value(&self, column: &str) -> Option<f64> {
        self.columns.iter().find(|c| c.name == column).map(|c| c.value)
    }

    /// A record is always exactly one row
    pub fn row_count(&self) -> usize {
        1
    }

    /// Partition directory for this record, e.g. `dt=2024-01-31`
    pub fn partition(&self) -> String {
        format!("{}={}", PARTITION_KEY, self.time.format("%Y-%m-%d"))
    }
}

impl fmt::Display for PriceRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for column in &self.columns {
            write!(f, "{}={} ", column.name, column.value)?;
        }
        write!(f, "{}={}", TIME_COLUMN, self.time.to_rfc3339())
    }
}
