//! Price data access port trait.

use crate::domain::error::RulebenchError;
use crate::domain::series::PriceSeries;
use std::path::Path;

pub trait DataPort {
    /// Load an OHLCV price table from the given source, sorted by date
    /// ascending.
    fn load_prices(&self, source: &Path) -> Result<PriceSeries, RulebenchError>;
}
