//! Market data port trait.

use chrono::NaiveDate;

use crate::domain::error::FinbytesError;
use crate::domain::metrics::BarInterval;
use crate::domain::ohlcv::OhlcvSeries;

pub trait DataPort {
    /// Bars for `symbol` between `start` and `end` inclusive, oldest first.
    /// A missing bound is open-ended. Source failures map to
    /// `FinbytesError::DataSource`; a window with no bars is `EmptySeries`.
    fn fetch(
        &self,
        symbol: &str,
        interval: BarInterval,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<OhlcvSeries, FinbytesError>;
}
