//! Report output port trait.

use std::path::Path;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::FinbytesError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        symbol: &str,
        result: &BacktestResult,
        output_path: &Path,
    ) -> Result<(), FinbytesError>;

    /// Several strategies run over the same symbol, written as one report.
    fn write_batch(
        &self,
        symbol: &str,
        results: &[BacktestResult],
        output_path: &Path,
    ) -> Result<(), FinbytesError>;
}
