//! Performance metrics.
//!
//! Computed once from the finished trade log and equity curve; nothing here
//! mutates the backtest state. Zero-trade convention: `win_rate` and
//! `avg_trade_return` are both 0.0 when the trade log is empty, and the test
//! suite relies on that convention.

use crate::domain::backtest::Trade;

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    /// final equity / initial capital - 1
    pub total_return: f64,
    /// Largest peak-to-trough fraction of the equity curve, in [0, 1].
    pub max_drawdown: f64,
    /// Fraction of trades with strictly positive return; 0 with no trades.
    pub win_rate: f64,
    /// Arithmetic mean of per-trade returns; 0 with no trades.
    pub avg_trade_return: f64,
    pub num_trades: usize,
}

impl Metrics {
    pub fn compute(trades: &[Trade], equity_curve: &[f64], initial_capital: f64) -> Self {
        let final_equity = equity_curve.last().copied().unwrap_or(initial_capital);
        let total_return = if initial_capital > 0.0 {
            final_equity / initial_capital - 1.0
        } else {
            0.0
        };

        let max_drawdown = compute_drawdown(equity_curve);

        let num_trades = trades.len();
        let (win_rate, avg_trade_return) = if num_trades > 0 {
            let wins = trades.iter().filter(|t| t.trade_return > 0.0).count();
            let sum: f64 = trades.iter().map(|t| t.trade_return).sum();
            (
                wins as f64 / num_trades as f64,
                sum / num_trades as f64,
            )
        } else {
            (0.0, 0.0)
        };

        Metrics {
            total_return,
            max_drawdown,
            win_rate,
            avg_trade_return,
            num_trades,
        }
    }
}

/// Maximum of (running_max - equity) / running_max over the curve; 0 for an
/// empty or non-decreasing curve.
fn compute_drawdown(equity_curve: &[f64]) -> f64 {
    let mut peak = f64::MIN;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    max_dd
}
