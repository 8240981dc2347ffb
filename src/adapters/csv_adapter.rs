//! CSV file data adapter.
//!
//! Expects a header row with a `date` column (`YYYY-MM-DD`) and numeric
//! columns including at least `open,high,low,close,volume`. Extra numeric
//! columns (for example a precomputed `yesterday_high`) are loaded under
//! their header names and become referenceable from rules. Rows are sorted
//! by date ascending.

use crate::domain::error::RulebenchError;
use crate::domain::series::PriceSeries;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

pub struct CsvAdapter;

impl CsvAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPort for CsvAdapter {
    fn load_prices(&self, source: &Path) -> Result<PriceSeries, RulebenchError> {
        let file = File::open(source).map_err(|e| RulebenchError::Data {
            reason: format!("failed to open {}: {}", source.display(), e),
        })?;
        let mut reader = csv::Reader::from_reader(file);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| RulebenchError::Data {
                reason: format!("CSV header error: {}", e),
            })?
            .iter()
            .map(str::to_string)
            .collect();

        let date_index = headers
            .iter()
            .position(|h| h == "date")
            .ok_or_else(|| RulebenchError::Data {
                reason: "missing 'date' column".into(),
            })?;

        let mut rows: Vec<(NaiveDate, Vec<f64>)> = Vec::new();
        for (line, result) in reader.records().enumerate() {
            let record = result.map_err(|e| RulebenchError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(date_index).ok_or_else(|| RulebenchError::Data {
                reason: format!("row {}: missing date", line + 2),
            })?;
            let date =
                NaiveDate::parse_from_str(date_str, "%Y-%m-%d").map_err(|e| {
                    RulebenchError::Data {
                        reason: format!("row {}: invalid date '{}': {}", line + 2, date_str, e),
                    }
                })?;

            let mut values = Vec::with_capacity(headers.len() - 1);
            for (i, header) in headers.iter().enumerate() {
                if i == date_index {
                    continue;
                }
                let raw = record.get(i).ok_or_else(|| RulebenchError::Data {
                    reason: format!("row {}: missing column '{}'", line + 2, header),
                })?;
                let value: f64 = raw.parse().map_err(|_| RulebenchError::Data {
                    reason: format!(
                        "row {}: invalid value '{}' in column '{}'",
                        line + 2,
                        raw,
                        header
                    ),
                })?;
                values.push(value);
            }
            rows.push((date, values));
        }

        rows.sort_by_key(|(date, _)| *date);

        let dates: Vec<NaiveDate> = rows.iter().map(|(date, _)| *date).collect();
        let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let value_headers: Vec<&String> = headers
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != date_index)
            .map(|(_, h)| h)
            .collect();
        for (j, header) in value_headers.iter().enumerate() {
            columns.insert(
                (*header).clone(),
                rows.iter().map(|(_, values)| values[j]).collect(),
            );
        }

        PriceSeries::new(dates, columns)
    }
}
