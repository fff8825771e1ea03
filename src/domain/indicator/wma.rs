//! Weighted Moving Average indicator.
//!
//! O(n) sliding window implementation.
//! WMA(n) = (1*P[i-n+1] + 2*P[i-n+2] + ... + n*P[i]) / (n*(n+1)/2)
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_wma(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Wma(period);
    indicator_type.validate()?;

    let mut values = Vec::with_capacity(bars.len());
    let divisor = (period * (period + 1)) as f64 / 2.0;
    let mut weighted_sum: f64 = 0.0;
    let mut window_sum: f64 = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period {
            let weight = (i + 1) as f64;
            weighted_sum += weight * bar.close;
            window_sum += bar.close;
        } else {
            weighted_sum += period as f64 * bar.close - window_sum;
            window_sum += bar.close - bars[i - period].close;
        }

        if i + 1 >= period {
            values.push(Some(IndicatorValue::Simple(weighted_sum / divisor)));
        } else {
            values.push(None);
        }
    }

    Ok(series_from(indicator_type, bars, values))
}
