//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::RulebenchError;
use crate::domain::expr::Strategy;
use std::io::Write;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy: &Strategy,
        out: &mut dyn Write,
    ) -> Result<(), RulebenchError>;
}
