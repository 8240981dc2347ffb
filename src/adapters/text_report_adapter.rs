//! Plain text report adapter.
//!
//! Writes the strategy, a metrics summary and the trade log to any
//! `io::Write` sink. The CLI points it at stdout; tests point it at a
//! `Vec<u8>`.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RulebenchError;
use crate::domain::expr::Strategy;
use crate::ports::report_port::ReportPort;
use std::io::Write;

pub struct TextReportAdapter;

impl TextReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        out: &mut dyn Write,
    ) -> Result<(), RulebenchError> {
        writeln!(out, "Strategy")?;
        writeln!(out, "  ENTRY: {}", strategy.entry)?;
        writeln!(out, "  EXIT: {}", strategy.exit)?;
        writeln!(out)?;

        let m = &result.metrics;
        writeln!(out, "Metrics")?;
        writeln!(out, "  total_return:     {:>10.4}%", m.total_return * 100.0)?;
        writeln!(out, "  max_drawdown:     {:>10.4}%", m.max_drawdown * 100.0)?;
        writeln!(out, "  win_rate:         {:>10.2}%", m.win_rate * 100.0)?;
        writeln!(
            out,
            "  avg_trade_return: {:>10.4}%",
            m.avg_trade_return * 100.0
        )?;
        writeln!(out, "  num_trades:       {:>10}", m.num_trades)?;
        writeln!(out)?;

        writeln!(out, "Trades")?;
        if result.trades.is_empty() {
            writeln!(out, "  (none)")?;
        } else {
            writeln!(
                out,
                "  {:<12} {:<12} {:>10} {:>10} {:>9} {:>5}",
                "entry", "exit", "entry_px", "exit_px", "return", "bars"
            )?;
            for trade in &result.trades {
                writeln!(
                    out,
                    "  {:<12} {:<12} {:>10.4} {:>10.4} {:>8.4}% {:>5}",
                    trade.entry_date,
                    trade.exit_date,
                    trade.entry_price,
                    trade.exit_price,
                    trade.trade_return * 100.0,
                    trade.duration
                )?;
            }
        }
        Ok(())
    }
}
