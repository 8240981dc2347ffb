//! Price table and signal series.
//!
//! `PriceSeries` is the read-only tabular input to evaluation: a date index
//! plus named f64 columns of equal length, at least `open`, `high`, `low`,
//! `close`, `volume`. Derived columns (`yesterday_high`) are precomputed up
//! front, never during evaluation.

use crate::domain::error::RulebenchError;
use chrono::NaiveDate;
use std::collections::BTreeMap;

pub const REQUIRED_COLUMNS: [&str; 5] = ["open", "high", "low", "close", "volume"];

#[derive(Debug, Clone)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    columns: BTreeMap<String, Vec<f64>>,
}

impl PriceSeries {
    /// Build a price table, validating that the required OHLCV columns are
    /// present and every column matches the date index length.
    pub fn new(
        dates: Vec<NaiveDate>,
        columns: BTreeMap<String, Vec<f64>>,
    ) -> Result<Self, RulebenchError> {
        for required in REQUIRED_COLUMNS {
            if !columns.contains_key(required) {
                return Err(RulebenchError::PriceTable {
                    reason: format!("missing required column '{}'", required),
                });
            }
        }
        for (name, values) in &columns {
            if values.len() != dates.len() {
                return Err(RulebenchError::PriceTable {
                    reason: format!(
                        "column '{}' has {} rows, expected {}",
                        name,
                        values.len(),
                        dates.len()
                    ),
                });
            }
        }
        Ok(Self { dates, columns })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Add the `yesterday_high` derived column: previous row's `high`, NaN at
    /// row 0. A no-op when the column is already present.
    pub fn with_yesterday_high(mut self) -> Self {
        if self.columns.contains_key("yesterday_high") {
            return self;
        }
        let high = &self.columns["high"];
        let mut shifted = Vec::with_capacity(high.len());
        if !high.is_empty() {
            shifted.push(f64::NAN);
            shifted.extend_from_slice(&high[..high.len() - 1]);
        }
        self.columns.insert("yesterday_high".to_string(), shifted);
        self
    }
}

/// One boolean per price row, aligned index-for-index with the table that
/// produced it. Rows inside an indicator's warm-up window are `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalSeries {
    values: Vec<bool>,
}

impl SignalSeries {
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> bool {
        self.values[index]
    }

    pub fn values(&self) -> &[bool] {
        &self.values
    }

    pub fn any(&self) -> bool {
        self.values.iter().any(|&v| v)
    }
}

#[cfg(test)]
pub mod testutil {
    use super::*;

    /// Price table with the given closes; open/high/low track close and
    /// volume is constant. Dates count up from 2024-01-01.
    pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
        let dates: Vec<NaiveDate> = (0..closes.len())
            .map(|i| {
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
            })
            .collect();
        let mut columns = BTreeMap::new();
        columns.insert("open".to_string(), closes.to_vec());
        columns.insert(
            "high".to_string(),
            closes.iter().map(|c| c + 1.0).collect(),
        );
        columns.insert("low".to_string(), closes.iter().map(|c| c - 1.0).collect());
        columns.insert("close".to_string(), closes.to_vec());
        columns.insert("volume".to_string(), vec![1_000_000.0; closes.len()]);
        PriceSeries::new(dates, columns).unwrap()
    }
}
