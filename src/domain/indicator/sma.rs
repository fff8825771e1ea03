//! Simple Moving Average indicator.
//!
//! SMA(n)[i] = mean(C[i-n+1..=i]). Warmup: first (n-1) bars are undefined.
//! The window sum is recomputed per bar rather than rolled, so values are the
//! exact trailing mean with no accumulated drift.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_sma(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Sma(period);
    indicator_type.validate()?;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    Ok(series_from(
        indicator_type,
        bars,
        rolling_mean(&closes, period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple)),
    ))
}

/// SMA over volumes rather than closes.
pub fn calculate_volume_sma(
    bars: &[OhlcvBar],
    period: usize,
) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::VolumeSma(period);
    indicator_type.validate()?;
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    Ok(series_from(
        indicator_type,
        bars,
        rolling_mean(&volumes, period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple)),
    ))
}

/// Trailing mean over `period` values; `None` until the window is full.
pub(crate) fn rolling_mean(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                let window = &values[i + 1 - period..=i];
                Some(window.iter().sum::<f64>() / period as f64)
            }
        })
        .collect()
}
