//! Analysis capability trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::FinbytesError;
use crate::domain::ohlcv::OhlcvSeries;

/// Turns a free-form request into a backtest over `series`.
///
/// Implementers decide how `query` maps to a strategy. The request layer
/// picks which implementer to call; the core does not fall back between
/// them.
pub trait Analyzer {
    fn analyze(&self, query: &str, series: &OhlcvSeries) -> Result<BacktestResult, FinbytesError>;
}
