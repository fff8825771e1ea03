//! Standard Deviation indicator.
//!
//! Sample standard deviation over n closing prices.
//! STDDEV(n)[i] = sqrt(sum((C[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{
    sample_stddev, series_from, IndicatorSeries, IndicatorType, IndicatorValue,
};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_stddev(
    bars: &[OhlcvBar],
    period: usize,
) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Stddev(period);
    indicator_type.validate()?;

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let values = (0..closes.len()).map(|i| {
        (i + 1 >= period)
            .then(|| IndicatorValue::Simple(sample_stddev(&closes[i + 1 - period..=i])))
    });

    Ok(series_from(indicator_type, bars, values))
}
