//! Backtest simulator.
//!
//! Single-position state machine over the entry/exit signal pair: `Flat`
//! until an entry signal, `Long` until an exit signal, long-only, fills at
//! the configured price column. Entry is checked before exit on each row, so
//! a row that signals both opens and immediately closes a zero-duration
//! trade. A position still open after the last row is force-closed at the
//! final price. An entry signal while long and an exit signal while flat are
//! both ignored.
//!
//! The equity curve has one point per price row, starts at the initial
//! capital and is marked to market while long:
//! `equity[i] = equity_at_entry * price[i] / entry_price`.

use crate::domain::error::{EvalError, RulebenchError};
use crate::domain::metrics::Metrics;
use crate::domain::series::{PriceSeries, SignalSeries};
use chrono::NaiveDate;

#[derive(Debug, Clone)]
pub struct BacktestConfig {
    /// Column used as the execution price.
    pub price_field: String,
    /// Equity curve starting value; 1.0 gives a normalized curve.
    pub initial_capital: f64,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            price_field: "close".to_string(),
            initial_capital: 1.0,
        }
    }
}

/// A completed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_date: NaiveDate,
    pub exit_price: f64,
    /// exit_price / entry_price - 1
    pub trade_return: f64,
    /// Rows held: exit_index - entry_index.
    pub duration: usize,
}

#[derive(Debug, Clone)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    /// One equity value per price row.
    pub equity_curve: Vec<f64>,
    pub metrics: Metrics,
}

struct OpenPosition {
    entry_index: usize,
    entry_price: f64,
    equity_at_entry: f64,
}

impl OpenPosition {
    fn close(self, dates: &[NaiveDate], exit_index: usize, exit_price: f64) -> Trade {
        Trade {
            entry_index: self.entry_index,
            entry_date: dates[self.entry_index],
            entry_price: self.entry_price,
            exit_index,
            exit_date: dates[exit_index],
            exit_price,
            trade_return: exit_price / self.entry_price - 1.0,
            duration: exit_index - self.entry_index,
        }
    }
}

/// Run the simulator over one price table and an aligned signal pair.
pub fn run_backtest(
    prices: &PriceSeries,
    entry: &SignalSeries,
    exit: &SignalSeries,
    config: &BacktestConfig,
) -> Result<BacktestResult, RulebenchError> {
    if entry.len() != prices.len() || exit.len() != prices.len() {
        return Err(RulebenchError::PriceTable {
            reason: format!(
                "signal length mismatch: {} rows, entry {}, exit {}",
                prices.len(),
                entry.len(),
                exit.len()
            ),
        });
    }
    let fills = prices
        .column(&config.price_field)
        .ok_or_else(|| EvalError::UnknownColumn {
            name: config.price_field.clone(),
        })?;
    let dates = prices.dates();

    let mut trades: Vec<Trade> = Vec::new();
    let mut equity_curve: Vec<f64> = Vec::with_capacity(prices.len());
    let mut equity = config.initial_capital;
    let mut position: Option<OpenPosition> = None;

    for i in 0..prices.len() {
        let price = fills[i];

        if position.is_none() && entry.get(i) {
            position = Some(OpenPosition {
                entry_index: i,
                entry_price: price,
                equity_at_entry: equity,
            });
        }

        if let Some(open) = position.as_ref() {
            equity = open.equity_at_entry * (price / open.entry_price);
        }

        if exit.get(i) {
            if let Some(open) = position.take() {
                trades.push(open.close(dates, i, price));
            }
        }

        equity_curve.push(equity);
    }

    // forced close at the final row
    if let Some(open) = position.take() {
        let last = prices.len() - 1;
        trades.push(open.close(dates, last, fills[last]));
    }

    let metrics = Metrics::compute(&trades, &equity_curve, config.initial_capital);

    Ok(BacktestResult {
        trades,
        equity_curve,
        metrics,
    })
}
