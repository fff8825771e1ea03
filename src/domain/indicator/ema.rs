//! Exponential Moving Average indicator.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) bars are undefined.

use crate::domain::error::FinbytesError;
use crate::domain::indicator::{series_from, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_ema(bars: &[OhlcvBar], period: usize) -> Result<IndicatorSeries, FinbytesError> {
    let indicator_type = IndicatorType::Ema(period);
    indicator_type.validate()?;
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    Ok(series_from(
        indicator_type,
        bars,
        ema_values(&closes, period)
            .into_iter()
            .map(|v| v.map(IndicatorValue::Simple)),
    ))
}

/// EMA over an arbitrary value stream. Leading `None`s in the input are
/// skipped: the seed is the mean of the first `period` defined values.
/// A `None` after the seed breaks the chain and restarts warmup.
pub(crate) fn ema_over(values: &[Option<f64>], period: usize) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema: Option<f64> = None;
    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;

    for value in values {
        match (*value, ema) {
            (None, _) => {
                ema = None;
                seed_sum = 0.0;
                seed_count = 0;
                out.push(None);
            }
            (Some(v), None) => {
                seed_sum += v;
                seed_count += 1;
                if seed_count == period {
                    ema = Some(seed_sum / period as f64);
                }
                out.push(ema);
            }
            (Some(v), Some(prev)) => {
                let next = prev + k * (v - prev);
                ema = Some(next);
                out.push(ema);
            }
        }
    }

    out
}

pub(crate) fn ema_values(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    ema_over(&values, period)
}
