#![allow(dead_code)]

use chrono::NaiveDate;
use rulebench::domain::builder::build_strategy;
use rulebench::domain::expr::Strategy;
use rulebench::domain::indicator::IndicatorRegistry;
use rulebench::domain::series::PriceSeries;
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Price table with the given closes; open/high/low track close and volume
/// is constant. Dates count up daily from 2024-01-01.
pub fn prices_from_closes(closes: &[f64]) -> PriceSeries {
    let dates: Vec<NaiveDate> = (0..closes.len())
        .map(|i| date(2024, 1, 1) + chrono::Duration::days(i as i64))
        .collect();
    let mut columns = BTreeMap::new();
    columns.insert("open".to_string(), closes.to_vec());
    columns.insert("high".to_string(), closes.iter().map(|c| c + 1.0).collect());
    columns.insert("low".to_string(), closes.iter().map(|c| c - 1.0).collect());
    columns.insert("close".to_string(), closes.to_vec());
    columns.insert("volume".to_string(), vec![1_000_000.0; closes.len()]);
    PriceSeries::new(dates, columns).unwrap()
}

pub fn build(dsl: &str) -> Strategy {
    build_strategy(dsl, &IndicatorRegistry::standard()).unwrap()
}

/// CSV fixture with one row per close, dated daily from 2024-01-01.
pub fn csv_from_closes(closes: &[f64]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "date,open,high,low,close,volume").unwrap();
    for (i, close) in closes.iter().enumerate() {
        let day = date(2024, 1, 1) + chrono::Duration::days(i as i64);
        writeln!(
            file,
            "{},{},{},{},{},1000000",
            day,
            close,
            close + 1.0,
            close - 1.0,
            close
        )
        .unwrap();
    }
    file
}
